pub mod rounded;
