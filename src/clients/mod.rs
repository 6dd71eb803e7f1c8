pub mod media_host;
