pub mod evaluate;
pub mod history;
pub mod init;
pub mod profiles;
pub mod validate;
