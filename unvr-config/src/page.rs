use std::fmt::Write as _;

use crate::rtsp_to_web::{RtspToWebConfig, mse_url};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Cams</title>
<style>
  .grid-container {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(1px,  400px));
    gap: 10px;
  }

  .mse-video {
    width: 100%;
    height: 100%;
    object-fit: cover;
  }

  @media screen and (max-width: 1920px) {
    .grid-container {
      grid-template-columns: repeat(auto-fit, minmax(1px, 500px));
    }
  }
</style>
</head>
<body>
<div class="grid-container">"#;

const PAGE_TAIL: &str = "\n</div><script src=\"main.js\"></script>\n</body>\n</html>";

/// Grid page with one muted autoplay video per stream. The player script
/// reads the MSE endpoint from the hidden `.mse-url` input preceding each
/// `.mse-video`.
pub fn render(config: &RtspToWebConfig, rtspw_ip: &str) -> String {
    let port = config.http_port();
    let host = escape_attr(rtspw_ip);
    let mut html = String::from(PAGE_HEAD);
    for key in config.streams.keys() {
        let url = mse_url(&host, port, &escape_attr(key));
        let _ = write!(
            html,
            "\n   <input type=\"hidden\" name=\"mse-url\" class=\"mse-url\" value=\"{}\">\n",
            url
        );
        html.push_str(
            "   <video class=\"mse-video\" autoplay muted playsinline controls style=\"max-width: 100%; max-height: 100%;\"></video>\n",
        );
    }
    html.push_str(PAGE_TAIL);
    html
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
