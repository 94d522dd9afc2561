pub struct Config {
    pub nodes_file_name: String,
    pub edges_file_name: String,
    pub info_file_name: String,
    /// Used when the source carries no info file.
    pub directed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nodes_file_name: "nodes.csv".into(),
            edges_file_name: "edges.csv".into(),
            info_file_name: "graph.csv".into(),
            directed: true,
        }
    }
}
