//! Presentation - アプリが前面にいる間に届いた通知の見せ方

use serde::{Deserialize, Serialize};

/// PresentationOptions は foreground で通知を受けたときの表示方法
///
/// 既定値はバナーと一覧に出して音を鳴らし、バッジは付けない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationOptions {
    pub show_banner: bool,
    pub show_list: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            show_banner: true,
            show_list: true,
            play_sound: true,
            set_badge: false,
        }
    }
}

impl PresentationOptions {
    /// どの方法でも表示しない（ホストには何も出ない）
    pub fn is_silent(&self) -> bool {
        !(self.show_banner || self.show_list || self.play_sound || self.set_badge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_show_and_sound_without_badge() {
        let options = PresentationOptions::default();
        assert!(options.show_banner && options.show_list && options.play_sound);
        assert!(!options.set_badge);
        assert!(!options.is_silent());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: PresentationOptions =
            serde_json::from_str(r#"{ "play_sound": false }"#).unwrap();
        assert_eq!(
            options,
            PresentationOptions {
                play_sound: false,
                ..PresentationOptions::default()
            }
        );
    }
}
