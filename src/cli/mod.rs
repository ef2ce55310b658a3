use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build or extend the passage index from a PDF
    Index {
        path: String,

        /// Maximum characters per chunk
        #[arg(long, default_value = "500")]
        max_length: usize,

        /// Empty the collection before indexing
        #[arg(long)]
        reset: bool,
    },

    /// Screen a listed company against the indexed Shariah texts
    Analyze {
        #[arg(short, long)]
        ticker: String,

        /// Financial Modeling Prep API key (defaults to FMP_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Number of passages to retrieve
        #[arg(short, default_value = "3")]
        k: usize,
    },

    /// Query the index directly and show scored passages
    Search {
        query: String,

        #[arg(short, default_value = "3")]
        k: usize,
    },

    Stats,
}
