use crate::app::ControllerOptions;
use clap::{ArgAction, Parser};
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "cv-extract-uploader",
    about = "Upload a ZIP archive of CVs to the extract server"
)]
pub struct Settings {
    /// Server the archive is posted to; `/extract_data` is resolved against its origin.
    #[arg(long, env = "CV_EXTRACT_SERVER_URL", default_value = "http://localhost:8000")]
    pub server_url: Url,

    /// Clear the processing spinner once a request settles.
    #[arg(
        long,
        env = "CV_EXTRACT_CLEAR_INDICATOR",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub clear_indicator_on_settle: bool,

    /// Refuse new clicks while a request is still running.
    #[arg(
        long,
        env = "CV_EXTRACT_GUARD_IN_FLIGHT",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub guard_in_flight: bool,

    /// Offer to save a returned workbook instead of the placeholder download.
    #[arg(
        long,
        env = "CV_EXTRACT_SAVE_WORKBOOK",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub save_workbook: bool,

    #[arg(long, env = "CV_EXTRACT_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Settings {
    /// Reads `.env` if present, then the command line and environment.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            clear_indicator_on_settle: self.clear_indicator_on_settle,
            guard_in_flight: self.guard_in_flight,
            save_workbook: self.save_workbook,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let settings = Settings::try_parse_from(["cv-extract-uploader"]).unwrap();
        assert_eq!(settings.server_url.as_str(), "http://localhost:8000/");
        assert_eq!(settings.log_filter, "info");

        let options = settings.controller_options();
        assert!(options.clear_indicator_on_settle);
        assert!(!options.guard_in_flight);
        assert!(!options.save_workbook);
        assert_eq!(options, ControllerOptions::default());
    }

    #[test]
    fn flags_override_defaults() {
        let settings = Settings::try_parse_from([
            "cv-extract-uploader",
            "--server-url",
            "https://cvs.example.com/app/",
            "--clear-indicator-on-settle",
            "false",
            "--guard-in-flight",
            "true",
            "--save-workbook",
            "true",
        ])
        .unwrap();

        assert_eq!(settings.server_url.host_str(), Some("cvs.example.com"));
        let options = settings.controller_options();
        assert!(!options.clear_indicator_on_settle);
        assert!(options.guard_in_flight);
        assert!(options.save_workbook);
    }

    #[test]
    fn bad_server_url_is_rejected() {
        assert!(Settings::try_parse_from(["cv-extract-uploader", "--server-url", "not a url"]).is_err());
    }
}
