use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::info;
use zip::{ZipArchive, read::ZipFile};

mod config;
pub mod models;
pub use config::*;
use models::*;

use crate::graph::{self, EdgeRecord, Graph, NodeRecord};

#[derive(Default, Debug, Clone)]
pub enum StorageType {
    #[default]
    None,
    Directory(PathBuf),
    Zip(PathBuf),
}

/// Reads the node and edge tables of one graph from disk.
///
/// This is the only place that knows about the on-disk layout; everything
/// downstream consumes [`NodeRecord`]s and [`EdgeRecord`]s.
#[derive(Default)]
pub struct GraphSource {
    config: Config,
    storage: StorageType,
}

impl GraphSource {
    pub fn new(config: self::Config) -> Self {
        Self {
            config,
            storage: Default::default(),
        }
    }

    pub fn from_zip<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.storage = StorageType::Zip(path.into());
        self
    }

    pub fn from_directory<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.storage = StorageType::Directory(path.into());
        self
    }

    /// Picks zip or directory storage from the path's extension.
    pub fn from_path<P: Into<PathBuf>>(self, path: P) -> Self {
        let path = path.into();
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip {
            self.from_zip(path)
        } else {
            self.from_directory(path)
        }
    }

    pub fn stream_nodes<F>(&self, f: F) -> Result<(), graph::Error>
    where
        F: FnMut((usize, CsvNode)),
    {
        self.stream::<CsvNode, F>(&self.config.nodes_file_name, f)
    }

    pub fn stream_edges<F>(&self, f: F) -> Result<(), graph::Error>
    where
        F: FnMut((usize, CsvEdge)),
    {
        self.stream::<CsvEdge, F>(&self.config.edges_file_name, f)
    }

    /// Reads directedness from the info file, falling back to the config.
    pub fn directed(&self) -> Result<bool, graph::Error> {
        let mut directed = None;
        match self.stream::<CsvGraphInfo, _>(&self.config.info_file_name, |(_, info)| {
            directed.get_or_insert(info.directed);
        }) {
            Ok(()) => Ok(directed.unwrap_or(self.config.directed)),
            Err(graph::Error::FileNotFound(_)) => Ok(self.config.directed),
            Err(err) => Err(err),
        }
    }

    /// Reads every table and builds a validated graph.
    /// Depending on the size of the data this can be a long blocking function.
    pub fn load(&self) -> Result<Graph, graph::Error> {
        let now = Instant::now();
        let directed = self.directed()?;

        let mut nodes: Vec<NodeRecord> = Vec::new();
        self.stream_nodes(|(_, node)| nodes.push(node.into()))?;
        let mut edges: Vec<EdgeRecord> = Vec::new();
        self.stream_edges(|(_, edge)| edges.push(edge.into()))?;

        let graph = Graph::from_records(nodes, edges, directed)?;
        info!(
            "Loaded {} nodes and {} edges in {:?}",
            graph.node_count(),
            graph.edge_count(),
            now.elapsed()
        );
        Ok(graph)
    }

    fn stream<T, F>(&self, file_name: &str, f: F) -> Result<(), graph::Error>
    where
        T: DeserializeOwned,
        F: FnMut((usize, T)),
    {
        match &self.storage {
            StorageType::None => Ok(()),
            StorageType::Directory(path) => stream_from_directory::<T, F>(path, file_name, f),
            StorageType::Zip(path) => stream_from_zip::<T, F>(path, file_name, f),
        }
    }
}

fn stream_from_directory<T, F>(dir: &Path, file_name: &str, f: F) -> Result<(), graph::Error>
where
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let path = dir.join(file_name);
    if !path.is_file() {
        return Err(graph::Error::FileNotFound(file_name.to_string()));
    }
    stream_csv(File::open(path)?, f)
}

fn stream_from_zip<T, F>(zip_path: &Path, file_name: &str, f: F) -> Result<(), graph::Error>
where
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let zip_file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(zip_file)?;
    let file = get_file(&mut archive, file_name)?;
    stream_csv(file, f)
}

fn stream_csv<R, T, F>(reader: R, mut f: F) -> Result<(), graph::Error>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    for (i, record) in reader.deserialize().enumerate() {
        f((i, record?));
    }
    Ok(())
}

fn get_file<'a>(
    archive: &'a mut ZipArchive<File>,
    name: &'a str,
) -> Result<ZipFile<'a, File>, graph::Error> {
    let index = archive
        .index_for_name(name)
        .ok_or(graph::Error::FileNotFound(name.to_string()))?;
    let file = archive.by_index(index)?;
    Ok(file)
}
