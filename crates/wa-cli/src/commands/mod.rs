pub mod batch;
pub mod login;
pub mod logout;
pub mod run;
pub mod whoami;
