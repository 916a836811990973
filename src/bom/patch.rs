// BOM page patching
// String-level edits of the exported BOM; no HTML parsing

/// Click logging in the minified BOM script (reference, model, value).
/// The labels are JS `\u` escapes in the file, so they are matched literally.
const CONSOLE_LOG_ORIGINAL: &str = r"Se=H.dataId[1],X=H.dataEle[1],ze=H.value;console.log(`\u5668\u4EF6\u7F16\u53F7:${Se}, \u5668\u4EF6\u578B\u53F7:${X}, \u503C:${ze}`)";

/// Same logging with the package appended
const CONSOLE_LOG_PATCHED: &str = r"Se=H.dataId[1],X=H.dataEle[1],ze=H.value,Oe=H.package[1];console.log(`\u5668\u4EF6\u7F16\u53F7:${Se}, \u5668\u4EF6\u578B\u53F7:${X}, \u503C:${ze}, \u5C01\u88C5:${Oe}`)";

const BRIDGE_TEMPLATE: &str = include_str!("../../assets/serial_bridge.html");

const BODY_CLOSE: &str = "</body>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    SnippetMissing,
    Disabled,
}

/// Make the BOM log the package of the clicked component
pub fn patch_console_log(html: &str) -> (String, PatchOutcome) {
    if html.contains(CONSOLE_LOG_ORIGINAL) {
        (
            html.replace(CONSOLE_LOG_ORIGINAL, CONSOLE_LOG_PATCHED),
            PatchOutcome::Applied,
        )
    } else {
        (html.to_string(), PatchOutcome::SnippetMissing)
    }
}

/// Serial bridge markup with the baud rate and lookup path filled in
pub fn render_bridge(baud_rate: u32, lightup_path: &str) -> String {
    BRIDGE_TEMPLATE
        .replace("{{BAUD_RATE}}", &baud_rate.to_string())
        .replace("{{LIGHTUP_PATH}}", lightup_path)
}

/// Insert `fragment` before the last `</body>`, or append it if there is none
pub fn inject_bridge(html: &str, fragment: &str) -> String {
    // ASCII lowercasing keeps byte offsets
    match html.to_ascii_lowercase().rfind(BODY_CLOSE) {
        Some(at) => {
            let mut out = String::with_capacity(html.len() + fragment.len());
            out.push_str(&html[..at]);
            out.push_str(fragment);
            out.push_str(&html[at..]);
            out
        }
        None => format!("{html}{fragment}"),
    }
}
