pub mod supply_graph;
