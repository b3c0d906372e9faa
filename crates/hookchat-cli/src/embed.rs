//! Host-page loader script
//!
//! `hookchat --embed-snippet https://chat.example.com` prints a script that a
//! third-party page can include to mount the hosted chat window in a fixed,
//! transparent frame pinned to the bottom-right corner.

use anyhow::bail;

/// Global flag that makes repeated inclusion of the loader a no-op
pub const LOADED_FLAG: &str = "__HOOKCHAT_LOADED";

/// Placement of the embedded chat frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedConfig {
    /// Origin serving the chat page, without a trailing slash
    pub origin: String,
    pub width_px: u32,
    pub height_px: u32,
    pub z_index: u32,
}

impl EmbedConfig {
    /// Frame of 450x850 px on top of everything else on the host page
    pub fn new(origin: &str) -> anyhow::Result<Self> {
        let origin = origin.trim().trim_end_matches('/');
        if !(origin.starts_with("https://") || origin.starts_with("http://")) {
            bail!("embed origin must start with http:// or https://, got '{}'", origin);
        }
        if origin.contains(['"', '\'', '\\', '<', '>', ' ']) {
            bail!("embed origin contains characters that cannot appear in a URL: '{}'", origin);
        }

        Ok(Self {
            origin: origin.to_string(),
            width_px: 450,
            height_px: 850,
            z_index: 2_147_483_647,
        })
    }

    /// Render the loader script
    pub fn snippet(&self) -> String {
        format!(
            r#"<script>
(function () {{
  if (window.{flag}) return;
  window.{flag} = true;

  var frame = document.createElement("iframe");
  frame.src = "{origin}/";
  frame.title = "Chat";
  var styles = {{
    position: "fixed",
    bottom: "0",
    right: "0",
    width: "{width}px",
    height: "{height}px",
    border: "none",
    background: "transparent",
    "color-scheme": "light",
    "z-index": "{z_index}",
    visibility: "visible"
  }};
  Object.keys(styles).forEach(function (key) {{
    frame.style.setProperty(key, styles[key], "important");
  }});
  frame.setAttribute("allowtransparency", "true");
  frame.setAttribute("frameborder", "0");
  frame.setAttribute("scrolling", "no");

  function mount() {{ document.body.appendChild(frame); }}
  if (document.body) {{ mount(); }} else {{ document.addEventListener("DOMContentLoaded", mount); }}
}})();
</script>"#,
            flag = LOADED_FLAG,
            origin = self.origin,
            width = self.width_px,
            height = self.height_px,
            z_index = self.z_index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_contents() {
        let snippet = EmbedConfig::new("https://chat.example.com/")
            .unwrap()
            .snippet();

        assert!(snippet.contains(r#"frame.src = "https://chat.example.com/";"#));
        assert!(snippet.contains(r#"width: "450px""#));
        assert!(snippet.contains(r#"height: "850px""#));
        assert!(snippet.contains(r#""z-index": "2147483647""#));
        assert!(snippet.contains(r#"background: "transparent""#));
        assert!(snippet.contains(r#"bottom: "0""#));
        assert!(snippet.contains(r#"right: "0""#));
    }

    #[test]
    fn test_snippet_guards_double_load() {
        let snippet = EmbedConfig::new("http://localhost:3000").unwrap().snippet();
        let guard = snippet.find("if (window.__HOOKCHAT_LOADED) return;").unwrap();
        let set = snippet.find("window.__HOOKCHAT_LOADED = true;").unwrap();
        let create = snippet.find("createElement").unwrap();
        assert!(guard < set && set < create);
    }

    #[test]
    fn test_rejects_bad_origins() {
        assert!(EmbedConfig::new("chat.example.com").is_err());
        assert!(EmbedConfig::new("javascript:alert(1)").is_err());
        assert!(EmbedConfig::new("https://x.com\";alert(1)//").is_err());
    }
}
