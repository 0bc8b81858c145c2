// Stack lifecycle commands
pub mod stack;
