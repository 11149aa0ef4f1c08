use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyrightCheckError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("{0} が設定されていません。環境変数または `copyright-check config` で設定してください")]
    MissingApiKey(&'static str),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] copyright_check_common::Error),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),
}

pub type Result<T> = std::result::Result<T, CopyrightCheckError>;
