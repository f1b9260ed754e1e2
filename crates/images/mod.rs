pub mod unsplash_client;
