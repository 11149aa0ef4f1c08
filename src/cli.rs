use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "copyright-check")]
#[command(about = "画像著作権リスク判定ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を判定してCSVレポートを出力
    Check {
        /// 画像ファイルまたはフォルダ（複数可）
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// pHash類似度閾値（CAUTION判定、0より大きく1以下）
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Lens検索の取得件数（3〜10）
        #[arg(short, long)]
        max_results: Option<usize>,

        /// 出力CSVファイル
        #[arg(short, long, default_value = "copyright_check_report.csv")]
        output: PathBuf,

        /// レポートJSONも保存（exportで再出力できる）
        #[arg(long)]
        json: Option<PathBuf>,

        /// Excelも出力
        #[arg(long)]
        excel: bool,
    },

    /// 保存済みレポートJSONからCSV/Excelを出力
    Export {
        /// レポートJSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力形式 (csv/excel/both)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 画像とURLの画像のpHash類似度を表示
    Compare {
        /// 対象画像
        #[arg(required = true)]
        image: PathBuf,

        /// 参照画像のURL
        #[arg(required = true)]
        url: String,
    },

    /// 設定を表示/編集
    Config {
        /// SerpApiのAPIキーを設定
        #[arg(long)]
        set_serpapi_key: Option<String>,

        /// GeminiのAPIキーを設定
        #[arg(long)]
        set_gemini_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or both", s)),
        }
    }
}
