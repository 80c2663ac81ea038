use lazy_static::lazy_static;
use regex::Regex;

// Chain and faucet names are used as lookup keys by clients.
lazy_static! {
    pub static ref NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9-_]+$").unwrap();
}
