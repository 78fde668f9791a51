mod common;
mod recommendation;
