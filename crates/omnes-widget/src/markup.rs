//! Self-contained markup, stylesheet, and fixed UI strings of the widget.
//!
//! The host attaches these once; element ids are stable so a browser shell
//! can bind its element references to them.

/// Id of the widget's root element.
pub const WIDGET_ID: &str = "omnes-chat-widget";

/// Text of the transient bubble shown while a reply is awaited.
pub const THINKING_TEXT: &str = "Pensando...";

/// Text that replaces the thinking bubble when an exchange fails.
pub const CONNECTION_APOLOGY: &str = "Error: No se pudo conectar con el asistente.";

/// Label of the talk control when speech recognition is unavailable.
pub const VOICE_UNSUPPORTED_LABEL: &str = "Tu navegador no permite dictado por voz";

/// Panel title.
pub const PANEL_TITLE: &str = "OMNES ASISTENTE";

pub const STYLESHEET: &str = r#"
#omnes-chat-widget { position: fixed; right: 20px; bottom: 20px; z-index: 10000; font-family: 'Inter', sans-serif; }
#omnes-toggle { width: 60px; height: 60px; border: none; border-radius: 50%; cursor: pointer; color: #fff; font-size: 24px; background: linear-gradient(135deg, #00ecff, #34d399); }
#omnes-panel { position: absolute; right: 0; bottom: 75px; width: 350px; height: 500px; display: none; flex-direction: column; overflow: hidden; border-radius: 15px; background: #0f172a; }
#omnes-panel.active { display: flex; }
#omnes-log { flex: 1; display: flex; flex-direction: column; gap: 10px; padding: 15px; overflow-y: auto; }
#omnes-form { display: flex; gap: 8px; padding: 15px; }
#omnes-input { flex: 1; padding: 8px 12px; border-radius: 8px; color: #fff; background: rgba(255,255,255,0.1); }
.omnes-btn { border: none; cursor: pointer; color: #fff; background: none; font-size: 18px; }
.omnes-btn:disabled { opacity: 0.3; cursor: not-allowed; }
.omnes-btn.listening { color: #00ecff; }
.msg { max-width: 80%; padding: 10px 14px; border-radius: 12px; font-size: 14px; line-height: 1.4; color: #f8fafc; }
.msg.user { align-self: flex-end; background: #1e293b; }
.msg.bot { align-self: flex-start; background: #334155; border-left: 3px solid #00ecff; }
.msg.thinking { font-style: italic; opacity: 0.7; }
"#;

pub const HTML: &str = r#"<div id="omnes-chat-widget">
  <button id="omnes-toggle" type="button" title="Abrir chat">💬</button>
  <div id="omnes-panel">
    <div class="omnes-head">
      <span>OMNES ASISTENTE</span>
      <button id="omnes-close" type="button" class="omnes-btn" title="Cerrar">✕</button>
    </div>
    <div id="omnes-log"></div>
    <form id="omnes-form">
      <input id="omnes-input" type="text" placeholder="Escribe aquí..." autocomplete="off">
      <button id="omnes-talk" type="button" class="omnes-btn" title="Hablar">🎙️</button>
      <button id="omnes-stop" type="button" class="omnes-btn" title="Parar voz">⏹️</button>
      <button type="submit" class="omnes-btn">➔</button>
    </form>
  </div>
</div>"#;

/// Everything a host needs to attach the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetMarkup {
    pub element_id: &'static str,
    pub stylesheet: &'static str,
    pub html: &'static str,
}

impl Default for WidgetMarkup {
    fn default() -> Self {
        Self {
            element_id: WIDGET_ID,
            stylesheet: STYLESHEET,
            html: HTML,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_contains_required_controls() {
        let markup = WidgetMarkup::default();
        for id in [
            WIDGET_ID,
            "omnes-toggle",
            "omnes-panel",
            "omnes-log",
            "omnes-form",
            "omnes-input",
            "omnes-talk",
            "omnes-stop",
        ] {
            assert!(markup.html.contains(&format!("id=\"{}\"", id)), "missing {}", id);
        }
        assert!(markup.html.contains(PANEL_TITLE));
    }

    #[test]
    fn test_stylesheet_targets_root() {
        assert!(STYLESHEET.contains(&format!("#{}", WIDGET_ID)));
        assert!(STYLESHEET.contains(".thinking"));
    }
}
