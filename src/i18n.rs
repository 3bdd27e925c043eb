//! User-facing messages in English and Spanish
//!
//! Log records stay in English; only what the command prints for the user
//! goes through this catalog.

use penkit_settings::Language;

/// Message keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    PromptInput,
    PromptOutput,
    Converted,
    Rescaled,
    Optimized,
    SettingsSaved,
    Stdout,
    Warning,
    Error,
}

/// Catalog lookup
///
/// Placeholders are `{}` and filled in order by [`format`].
pub fn text(lang: Language, msg: Msg) -> &'static str {
    match lang {
        Language::En => match msg {
            Msg::PromptInput => "Input file (SVG or G-code, - for stdin): ",
            Msg::PromptOutput => "Output file or directory (- for stdout): ",
            Msg::Converted => "Converted {}: {} strokes, {} lines -> {}",
            Msg::Rescaled => "Rescaled by {:.4} -> {}",
            Msg::Optimized => "Rewrote {} travel moves ({}%) -> {}",
            Msg::SettingsSaved => "Settings saved to {}",
            Msg::Stdout => "standard output",
            Msg::Warning => "warning",
            Msg::Error => "error",
        },
        Language::Es => match msg {
            Msg::PromptInput => "Archivo de entrada (SVG o G-code, - para stdin): ",
            Msg::PromptOutput => "Archivo o directorio de salida (- para stdout): ",
            Msg::Converted => "Convertido {}: {} trazos, {} líneas -> {}",
            Msg::Rescaled => "Reescalado por {:.4} -> {}",
            Msg::Optimized => "{} movimientos de desplazamiento reescritos ({}%) -> {}",
            Msg::SettingsSaved => "Configuración guardada en {}",
            Msg::Stdout => "salida estándar",
            Msg::Warning => "aviso",
            Msg::Error => "error",
        },
    }
}

/// Fill the placeholders of a catalog entry
///
/// `{}` takes the next argument as is; `{:.4}` takes it as a number with
/// four decimals.
pub fn format(lang: Language, msg: Msg, args: &[&dyn std::fmt::Display]) -> String {
    let template = text(lang, msg);
    let mut out = String::with_capacity(template.len() + 16);
    let mut args = args.iter();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let Some(len) = rest[start..].find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let placeholder = &rest[start + 1..start + len];
        match args.next() {
            Some(arg) => match placeholder.strip_prefix(":.").and_then(|p| p.parse::<usize>().ok()) {
                Some(precision) => {
                    let value = arg.to_string();
                    match value.parse::<f64>() {
                        Ok(v) => out.push_str(&format!("{:.*}", precision, v)),
                        Err(_) => out.push_str(&value),
                    }
                }
                None => out.push_str(&arg.to_string()),
            },
            None => out.push_str(&rest[start..=start + len]),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}
