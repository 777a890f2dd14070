/// Tunables for a game session
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// URL (web) or file path (native) of the binary glTF scene
    pub asset_path: String,
    /// World units moved per frame on each horizontal axis
    pub speed: f32,
    /// Arena is `[-half_extent, half_extent]` on x and z
    pub arena_half_extent: f32,
    /// Fixed y offset of the avatar above the ground plane
    pub avatar_height: f32,
    pub avatar_node: String,
    pub field_node: String,
    /// Field children with these names are rendered but never collide
    pub non_collidable: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            asset_path: "glb/object.glb".to_string(),
            speed: 0.025,
            arena_half_extent: 5.0,
            avatar_height: 0.1,
            avatar_node: "avater".to_string(),
            field_node: "field".to_string(),
            non_collidable: vec!["wall".to_string()],
        }
    }
}

impl GameConfig {
    /// Defaults, with `FIELDWALK_ASSET` overriding the asset path
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("FIELDWALK_ASSET") {
            config.asset_path = path;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = GameConfig::default();
        assert_eq!(c.speed, 0.025);
        assert_eq!(c.arena_half_extent, 5.0);
        assert_eq!(c.non_collidable, vec!["wall".to_string()]);
        assert_eq!(c.avatar_node, "avater");
    }
}
