use crate::invoke::MethodSpec;
use crate::spec::{ArgumentType, FieldSpec};
use crate::tx_options::{TxOptionKey, TxOptionSpec, TxOptionSpecs};

/// A named, ready-made method description.
#[derive(Clone, Debug)]
pub struct Task {
    pub name: &'static str,
    pub description: &'static str,
    pub method: MethodSpec,
}

fn field(name: &str, description: &str, message: &str, ty: impl Into<ArgumentType>) -> FieldSpec {
    FieldSpec::new(name, ty)
        .with_description(description)
        .with_message(message)
}

fn address(name: &str, description: &str, message: &str) -> FieldSpec {
    field(name, description, message, "smart-address")
}

fn amount(name: &str, description: &str, message: &str) -> FieldSpec {
    field(name, description, message, "uint256")
}

/// Every option is accepted and left to the transport unless given.
fn standard_tx_options() -> TxOptionSpecs {
    TxOptionKey::ALL
        .into_iter()
        .fold(TxOptionSpecs::new(), |specs, key| {
            specs.with(key, TxOptionSpec::default_to(None))
        })
}

fn call(name: &'static str, description: &'static str, method: &str, arguments: Vec<FieldSpec>) -> Task {
    Task {
        name,
        description,
        method: MethodSpec::call(method, arguments),
    }
}

fn send(name: &'static str, description: &'static str, method: &str, arguments: Vec<FieldSpec>) -> Task {
    Task {
        name,
        description,
        method: MethodSpec::send(method, arguments, standard_tx_options()),
    }
}

fn erc20() -> Vec<Task> {
    vec![
        call(
            "erc20:total-supply",
            "Invokes totalSupply()(uint256) on an ERC-20 contract",
            "totalSupply",
            vec![],
        ),
        call(
            "erc20:balance-of",
            "Invokes balanceOf(address)(uint256) on an ERC-20 contract",
            "balanceOf",
            vec![address(
                "address",
                "The address to query the balance for",
                "Who do you want to query the balance for?",
            )],
        ),
        send(
            "erc20:transfer",
            "Invokes transfer(address,uint256) on an ERC-20 contract",
            "transfer",
            vec![
                address("to", "The address to send tokens to", "Who do you want to send tokens to?"),
                amount("amount", "The amount to send", "What's the amount to send?"),
            ],
        ),
        call(
            "erc20:allowance",
            "Invokes allowance(address,address)(uint256) on an ERC-20 contract",
            "allowance",
            vec![
                address(
                    "owner",
                    "The owner of the tokens",
                    "Who'll be the owner you want to query for?",
                ),
                address(
                    "spender",
                    "The account allowed to spend the tokens",
                    "Who'll be the user to query the # of allowed tokens?",
                ),
            ],
        ),
        send(
            "erc20:approve",
            "Invokes approve(address,uint256) on an ERC-20 contract",
            "approve",
            vec![
                address(
                    "spender",
                    "The account to allow spending tokens",
                    "Who do you want to allow spending your tokens?",
                ),
                amount("amount", "The amount to allow", "What's the amount to allow?"),
            ],
        ),
        send(
            "erc20:transfer-from",
            "Invokes transferFrom(address,address,uint256) on an ERC-20 contract",
            "transferFrom",
            vec![
                address(
                    "from",
                    "The address to take tokens from",
                    "Who do you want to send tokens from? (must be you or must approve you)",
                ),
                address("to", "The address to send tokens to", "Who do you want to send tokens to?"),
                amount("amount", "The amount to send", "What's the amount to send?"),
            ],
        ),
    ]
}

fn erc721() -> Vec<Task> {
    let token_id = |verb: &str| {
        amount(
            "tokenId",
            &format!("The ID of the token to {verb}"),
            &format!("What's the ID of the token to {verb}?"),
        )
    };
    vec![
        call(
            "erc721:balance-of",
            "Invokes balanceOf(address)(uint256) on an ERC-721 contract",
            "balanceOf",
            vec![address(
                "owner",
                "The address to query the balance for",
                "Who do you want to query the balance for?",
            )],
        ),
        call(
            "erc721:owner-of",
            "Invokes ownerOf(uint256)(address) on an ERC-721 contract",
            "ownerOf",
            vec![token_id("query")],
        ),
        send(
            "erc721:approve",
            "Invokes approve(address,uint256) on an ERC-721 contract",
            "approve(address,uint256)",
            vec![
                address(
                    "to",
                    "The address to approve the token to",
                    "Who do you want to approve the token to?",
                ),
                token_id("approve"),
            ],
        ),
        send(
            "erc721:transfer-from",
            "Invokes transferFrom(address,address,uint256) on an ERC-721 contract",
            "transferFrom(address,address,uint256)",
            vec![
                address(
                    "from",
                    "The address to send the token from",
                    "Who do you want to send the token from? (must be you or must approve you)",
                ),
                address("to", "The address to send the token to", "Who do you want to send the token to?"),
                token_id("transfer"),
            ],
        ),
        send(
            "erc721:set-approval-for-all",
            "Invokes setApprovalForAll(address,bool) on an ERC-721 contract",
            "setApprovalForAll",
            vec![
                address(
                    "operator",
                    "The address to make an operator for all your tokens",
                    "Who do you want to make/undo an operator for all your tokens?",
                ),
                field(
                    "approved",
                    "Whether to approve or not as an operator",
                    "Do you want to approve this address (y) or un-approve it (n) as an operator?",
                    "boolean",
                ),
            ],
        ),
    ]
}

fn erc1155() -> Vec<Task> {
    vec![
        call(
            "erc1155:balance-of",
            "Invokes balanceOf(address,uint256) on an ERC-1155 contract",
            "balanceOf",
            vec![
                address(
                    "address",
                    "The address to query the balance for",
                    "Who do you want to query the balance for?",
                ),
                amount(
                    "tokenId",
                    "The ID of the token to query the balance for",
                    "What's the ID of the token you want to query the balance for?",
                ),
            ],
        ),
        call(
            "erc1155:balance-of-batch",
            "Invokes balanceOfBatch(address[],uint256[]) on an ERC-1155 contract",
            "balanceOfBatch",
            vec![
                field(
                    "accounts",
                    "The addresses to query balances for",
                    "Which addresses do you want to query?",
                    ArgumentType::array("smart-address", None),
                ),
                field(
                    "ids",
                    "The token IDs, one per address",
                    "Which token IDs do you want to query?",
                    ArgumentType::array("uint256", None),
                ),
            ],
        ),
        send(
            "erc1155:set-approval-for-all",
            "Invokes setApprovalForAll(address,bool) on an ERC-1155 contract",
            "setApprovalForAll",
            vec![
                address(
                    "address",
                    "The address to make an operator for all your tokens",
                    "Who do you want to make/undo an operator for all your tokens?",
                ),
                field(
                    "approve",
                    "Whether to approve or not as an operator",
                    "Do you want to approve this address (y) or un-approve it (n) as an operator?",
                    "boolean",
                ),
            ],
        ),
        send(
            "erc1155:safe-transfer-from",
            "Invokes safeTransferFrom(address,address,uint256,uint256,bytes) on an ERC-1155 contract",
            "safeTransferFrom",
            vec![
                address(
                    "from",
                    "The address to send tokens from",
                    "Who do you want to send tokens from? (must be you or must approve you)",
                ),
                address("to", "The address to send tokens to", "Who do you want to send tokens to?"),
                amount("id", "The ID of the token", "What's the ID of the token to send?"),
                amount("value", "The amount of that token", "What's the amount to send?"),
                field("data", "Extra data for the receiver", "Add some hexadecimal binary data:", "bytes"),
            ],
        ),
    ]
}

fn native() -> Vec<Task> {
    let recipient = address(
        "address",
        "The address (or account index) to send native tokens to",
        "What's the address (or account index) to send native tokens to?",
    );
    vec![
        call(
            "native:balance-of",
            "Gets the native balance of an account",
            "getBalance",
            vec![address(
                "address",
                "The address (or account index) to query the balance for",
                "What's the address (or account index) you want to query the balance for?",
            )],
        ),
        Task {
            name: "native:transfer",
            description: "Transfers native currency to another account",
            method: MethodSpec::send(
                "transfer",
                vec![recipient],
                TxOptionSpecs::new()
                    .with(TxOptionKey::Value, TxOptionSpec::prompt())
                    .with(TxOptionKey::Account, TxOptionSpec::default_to(None))
                    .with(TxOptionKey::GasPrice, TxOptionSpec::default_to(None)),
            ),
        },
    ]
}

fn misc() -> Vec<Task> {
    vec![call(
        "misc:keccak256",
        "Computes a keccak256 hash over a text",
        "keccak256",
        vec![field("text", "The text to hash", "What's the text to hash?", "string")],
    )]
}

/// All built-in tasks, grouped by token standard.
pub fn catalog() -> Vec<Task> {
    let mut tasks = erc20();
    tasks.extend(erc721());
    tasks.extend(erc1155());
    tasks.extend(native());
    tasks.extend(misc());
    tasks
}

pub fn find_task(name: &str) -> Option<Task> {
    catalog().into_iter().find(|task| task.name == name)
}
