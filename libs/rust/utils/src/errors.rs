//env
pub const ETHEREUM_NODE_URL_NOT_SET: &str = "ETHEREUM_NODE_URL not set!";
pub const INVALID_ETHEREUM_NODE_URL: &str = "ETHEREUM_NODE_URL is not a valid URL";
pub const INVALID_SAFE_ADDRESS: &str = "SAFE_ADDRESS is not a valid address";
pub const INVALID_DAO_PROXY_ADDRESS: &str = "NOUNS_DAO_PROXY_ADDRESS is not a valid address";

//config
pub const CONFIG_ALREADY_INITIALIZED: &str = "Multisig config already initialized";
pub const CONFIG_NOT_INITIALIZED: &str = "Multisig config not initialized";

//subgraph
pub const SUBGRAPH_REQUEST_FAILED: &str = "Failed to send subgraph request";
pub const SUBGRAPH_DECODE_FAILED: &str = "Failed to decode subgraph response";

//safe
pub const SAFE_REQUEST_FAILED: &str = "Failed to send Safe transaction service request";
pub const SAFE_DECODE_FAILED: &str = "Failed to decode Safe transaction service response";

//chain
pub const BLOCK_NUMBER_FETCH_FAILED: &str = "Failed to fetch latest block number";
