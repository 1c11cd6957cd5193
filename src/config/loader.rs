//! 配置加载器

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::PathBuf;

use crate::config::config::AppConfig;
use crate::error::Result;

/// 配置加载器
///
/// 合并顺序：`kokoro.toml`（可缺省）→ `KOKORO_` 前缀环境变量。
/// 嵌套键用双下划线分隔，例如 `KOKORO_SERVER__PORT=8080`。
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    pub fn load() -> Result<AppConfig> {
        let config = Figment::new()
            .merge(Toml::file("kokoro.toml"))
            .merge(Env::prefixed("KOKORO_").split("__"))
            .extract()?;
        Ok(config)
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig> {
        let config = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("KOKORO_").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_file_uses_defaults() {
        // kokoro.toml が無くても既定値で起動できる
        let config = ConfigLoader::load_from(PathBuf::from("nonexistent.toml")).unwrap();
        assert_eq!(config.server.port, 5001);
    }
}
