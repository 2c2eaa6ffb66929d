//! Configuration for provenance output.

/// Controls how provenance graphs are rendered and saved.
#[derive(Clone, Debug, PartialEq)]
pub struct ProvenanceConfig {
    /// Name of the emitted `strict digraph`.
    pub graph_name: String,

    /// Node margin passed to the renderer.
    pub margin: f64,

    /// Emit a comment block describing the node shapes.
    pub legend: bool,

    /// Whether generating provenance also writes a `.dot` file.
    pub write_dot: bool,
}

impl Default for ProvenanceConfig {
    fn default() -> Self {
        Self {
            graph_name: "provenance".to_string(),
            margin: 0.1,
            legend: false,
            write_dot: true,
        }
    }
}

impl ProvenanceConfig {
    /// Creates a configuration with a legend and node-count summary.
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            legend: true,
            ..Self::default()
        }
    }

    /// Builder method to set the graph name.
    #[must_use]
    pub fn with_graph_name(mut self, name: impl Into<String>) -> Self {
        self.graph_name = name.into();
        self
    }

    /// Builder method to set the node margin.
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Builder method to enable/disable the legend.
    #[must_use]
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Builder method to enable/disable writing `.dot` files.
    #[must_use]
    pub fn with_write_dot(mut self, write: bool) -> Self {
        self.write_dot = write;
        self
    }
}
