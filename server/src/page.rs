//! Minimal HTML front-end: a form plus an embedded player for the result.

use gemini_core::PREBUILT_VOICES;

use crate::delivery::GeneratedAudio;
use crate::error::ApiError;

pub enum PageOutcome<'a> {
    Empty,
    Audio(&'a GeneratedAudio),
    Error(&'a ApiError),
}

pub fn render_page(text: &str, voice: &str, outcome: PageOutcome<'_>) -> String {
    let mut options = String::new();
    for name in PREBUILT_VOICES {
        let selected = if *name == voice { " selected" } else { "" };
        options.push_str(&format!("<option value=\"{name}\"{selected}>{name}</option>"));
    }

    let result = match outcome {
        PageOutcome::Empty => String::new(),
        PageOutcome::Audio(audio) => {
            let src = format!(
                "data:{};base64,{}",
                escape_html(&audio.content_type),
                audio.audio_base64
            );
            format!(
                concat!(
                    "<section class=\"result\">",
                    "<audio controls src=\"{src}\"></audio>",
                    "<p><a download=\"speech{ext}\" href=\"{src}\">Download speech{ext}</a></p>",
                    "<p class=\"meta\">Upstream type: <code>{mime}</code></p>",
                    "</section>"
                ),
                src = src,
                ext = audio.file_extension,
                mime = escape_html(&audio.mime_type),
            )
        }
        PageOutcome::Error(err) => format!(
            "<section class=\"error\"><p>{}</p></section>",
            escape_html(&err.public_message())
        ),
    };

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\"><head><meta charset=\"utf-8\">",
            "<title>Gemini TTS</title>",
            "<style>body{{font-family:sans-serif;max-width:40rem;margin:2rem auto}}",
            "textarea{{width:100%;min-height:8rem}}.error{{color:#b00020}}",
            ".meta{{color:#666;font-size:.9em}}</style>",
            "</head><body>",
            "<h1>Gemini Text-to-Speech</h1>",
            "<form method=\"get\" action=\"\">",
            "<p><textarea name=\"text\" placeholder=\"Type something to say\">{text}</textarea></p>",
            "<p><label>Voice <select name=\"voice\">{options}</select></label> ",
            "<button type=\"submit\">Generate</button></p>",
            "</form>{result}</body></html>\n"
        ),
        text = escape_html(text),
        options = options,
        result = result,
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_audio() -> GeneratedAudio {
        GeneratedAudio {
            audio_base64: "UklGRg==".to_string(),
            file_extension: ".wav",
            mime_type: "audio/L16;rate=24000".to_string(),
            content_type: "audio/wav".to_string(),
            wrapped: true,
            size_bytes: 4,
        }
    }

    #[test]
    fn test_empty_page_has_form() {
        let html = render_page("", "Zephyr", PageOutcome::Empty);
        assert!(html.contains("<form"));
        assert!(html.contains("<option value=\"Zephyr\" selected>"));
        assert!(!html.contains("<audio"));
    }

    #[test]
    fn test_audio_page_embeds_player() {
        let audio = sample_audio();
        let html = render_page("Hello", "Kore", PageOutcome::Audio(&audio));
        assert!(html.contains("src=\"data:audio/wav;base64,UklGRg==\""));
        assert!(html.contains("download=\"speech.wav\""));
        assert!(html.contains("<option value=\"Kore\" selected>"));
        assert!(html.contains(">Hello</textarea>"));
    }

    #[test]
    fn test_error_page() {
        let err = ApiError::GenerationFailed;
        let html = render_page("Hello", "Zephyr", PageOutcome::Error(&err));
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("Failed to generate audio"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_page("</textarea><script>alert('x')</script>", "Zephyr", PageOutcome::Empty);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
    }
}
