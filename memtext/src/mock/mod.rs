pub mod handler;
pub mod key_value;
pub mod mock_server;
pub mod value;
