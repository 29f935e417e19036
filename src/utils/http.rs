use once_cell::sync::Lazy;
use reqwest::Client;

// No explicit timeout: an in-flight generation runs until the transport
// default gives up, and the UI never cancels it.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .build()
        .expect("Failed to build HTTP client")
});

pub fn get_http_client() -> &'static Client {
    &HTTP_CLIENT
}
