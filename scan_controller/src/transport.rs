use arm_scan_lib::{CaptureId, ControllerConfig};
use eyre::{Result, WrapErr};
use reqwest::blocking::Client;
use tracing::{debug, info};

/// Request/response link to the arm controller.
pub trait CommandTransport {
    /// Sends one wire command and returns the HTTP status code.
    fn send(&self, wire: &str) -> Result<u16>;

    /// Downloads the image stored under `id`.
    fn fetch_image(&self, id: CaptureId) -> Result<Vec<u8>>;
}

/// Talks to the controller's `robot.php` endpoint.
pub struct HttpTransport {
    client: Client,
    server_url: String,
    operator_id: String,
    password: String,
    image_extension: String,
}

impl HttpTransport {
    pub fn new(config: &ControllerConfig, password: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .wrap_err("Failed to build HTTP client")?;

        Ok(Self {
            client,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            operator_id: config.operator_id.clone(),
            password,
            image_extension: config.image_extension.clone(),
        })
    }

    fn command_url(&self) -> String {
        format!("{}/robot.php", self.server_url)
    }

    fn image_url(&self, id: CaptureId) -> String {
        format!("{}/robot/{}.{}", self.server_url, id, self.image_extension)
    }
}

impl CommandTransport for HttpTransport {
    fn send(&self, wire: &str) -> Result<u16> {
        info!("Sending command: \"{}\"", wire);

        let response = self
            .client
            .get(self.command_url())
            .query(&[
                ("o", self.operator_id.as_str()),
                ("m", "Y"),
                ("p", self.password.as_str()),
                ("c", wire),
            ])
            .send()
            .wrap_err_with(|| format!("Failed to send command \"{}\"", wire))?;

        let status = response.status().as_u16();
        info!("HTTP Response Code: {}", status);
        Ok(status)
    }

    fn fetch_image(&self, id: CaptureId) -> Result<Vec<u8>> {
        let url = self.image_url(id);
        debug!("Fetching {}", url);

        let bytes = self
            .client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .wrap_err_with(|| format!("Failed to download image #{}", id))?;

        Ok(bytes.to_vec())
    }
}
