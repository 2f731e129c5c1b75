pub mod local_chain;
