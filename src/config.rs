use std::env;

use crate::gateway::EsewaConfig;

// eSewa sandbox credentials, published in the gateway's integration docs.
// Only used as defaults in dev mode; production must set the env vars.
const ESEWA_TEST_SECRET_KEY: &str = "8gBm/:&EnhH.1/q";
const ESEWA_TEST_PRODUCT_CODE: &str = "EPAYTEST";
const ESEWA_TEST_CHECKOUT_URL: &str = "https://rc-epay.esewa.com.np/api/epay/main/v2/form";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    pub success_page_url: String,
    pub failure_page_url: String,
    pub esewa: EsewaConfig,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("CREATORPAY_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let esewa = if dev_mode {
            EsewaConfig {
                secret_key: env::var("ESEWA_SECRET_KEY")
                    .unwrap_or_else(|_| ESEWA_TEST_SECRET_KEY.to_string()),
                product_code: env::var("ESEWA_PRODUCT_CODE")
                    .unwrap_or_else(|_| ESEWA_TEST_PRODUCT_CODE.to_string()),
                checkout_url: env::var("ESEWA_CHECKOUT_URL")
                    .unwrap_or_else(|_| ESEWA_TEST_CHECKOUT_URL.to_string()),
            }
        } else {
            EsewaConfig {
                secret_key: env::var("ESEWA_SECRET_KEY")
                    .expect("ESEWA_SECRET_KEY must be set outside dev mode"),
                product_code: env::var("ESEWA_PRODUCT_CODE")
                    .expect("ESEWA_PRODUCT_CODE must be set outside dev mode"),
                checkout_url: env::var("ESEWA_CHECKOUT_URL")
                    .expect("ESEWA_CHECKOUT_URL must be set outside dev mode"),
            }
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "creatorpay.db".to_string()),
            success_page_url: env::var("SUCCESS_PAGE_URL")
                .unwrap_or_else(|_| format!("{}/payment/success", base_url)),
            failure_page_url: env::var("FAILURE_PAGE_URL")
                .unwrap_or_else(|_| format!("{}/payment/failure", base_url)),
            base_url,
            esewa,
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
