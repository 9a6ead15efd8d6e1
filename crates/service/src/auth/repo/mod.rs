pub mod http;
pub mod seaorm;
