mod display;
mod expr;
