use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiDetectError {
    #[error("画像ファイルとして読み込めません: {0}")]
    InvalidInput(String),

    #[error("解析サービスエラー: {message}")]
    Service { message: String, details: String },

    #[error("接続エラー: サーバーに接続できません。接続を確認して再試行してください")]
    Transport(String),

    #[error("画像デコードエラー: {0}")]
    Decode(String),

    #[error("オーバーレイ除去後の画像高さが{0}pxになるため復元できません")]
    Dimension(i64),

    #[error("判定結果がありません。先に解析を実行してください")]
    MissingVerdict,

    #[error("履歴エントリが見つかりません: {0}")]
    HistoryIndex(usize),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("画像処理エラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AiDetectError>;
