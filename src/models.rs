pub mod lead;
