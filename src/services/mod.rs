pub mod paseto;
