/// 環境変数ユーティリティ
pub struct EnvVar;

/// ユーザー名が取得できない場合の既定値
pub const UNKNOWN_USER: &str = "Unknown User";

impl EnvVar {
    /// 環境変数を取得（空文字列はNoneとして扱う）
    pub fn get(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

    /// 現在のユーザー名を取得
    ///
    /// 優先順位: MODPORT_USER > USER > USERNAME > "Unknown User"
    pub fn current_user_name() -> String {
        ["MODPORT_USER", "USER", "USERNAME"]
            .iter()
            .find_map(|key| Self::get(key))
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    }
}
