pub(crate) mod code;
pub use code::{ALPHABET, Code, CodeError, is_alphabet_char, normalize};

pub(crate) mod config;
pub use config::{AppConfig, AppConfigError, Config, LogConfig, StorageConfig};

pub(crate) mod key_status;
pub use key_status::KeyStatus;

pub(crate) mod pack_info;
pub use pack_info::{KeyRecord, NewPack, PackInfo, PackStatus};
