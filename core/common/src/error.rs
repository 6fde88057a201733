//! エラーハンドリング
//!
//! 全レイヤーで共通のエラー型。種類ごとに終了コードを持ち、main でそのままプロセス終了コードにする。

/// エラー型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// 引数不正（usage を表示する）
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Json(String),
    /// 環境変数の解決失敗（HOME 未設定など）
    #[error("{0}")]
    Env(String),
    /// 設定ファイルの内容が不正
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Http(String),
    /// モデルファイルが見つからない（オペレータへの再問い合わせも打ち切られた）
    #[error("No model file found: {0}")]
    MissingArtifact(String),
    /// 推論エンジンがモデル・設定を受け付けなかった
    #[error("Failed to load model: {0}")]
    Load(String),
    /// ストリーミング生成中の失敗
    #[error("Generation failed: {0}")]
    Generation(String),
    /// Ctrl+C による中断
    #[error("Interrupted")]
    Interrupted,
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn io_msg(msg: impl Into<String>) -> Self {
        Error::Io(msg.into())
    }

    pub fn json(msg: impl Into<String>) -> Self {
        Error::Json(msg.into())
    }

    pub fn env(msg: impl Into<String>) -> Self {
        Error::Env(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Error::Http(msg.into())
    }

    pub fn missing_artifact(msg: impl Into<String>) -> Self {
        Error::MissingArtifact(msg.into())
    }

    pub fn load(msg: impl Into<String>) -> Self {
        Error::Load(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Error::Generation(msg.into())
    }

    /// usage を併せて表示すべきエラーか
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// プロセス終了コード（sysexits.h に準拠）
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => 64,
            Error::Json(_) => 65,
            Error::MissingArtifact(_) => 66,
            Error::Load(_) | Error::Generation(_) => 70,
            Error::Io(_) | Error::Http(_) => 74,
            Error::Env(_) | Error::Config(_) => 78,
            Error::Interrupted => 130,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e.to_string())
    }
}
