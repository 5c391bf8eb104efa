fn main() {
    // ESP-IDF build-system environment propagation is only meaningful when
    // the espidf feature (and therefore the esp-idf-sys crate) is enabled.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
