pub mod dfg;
