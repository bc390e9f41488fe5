fn main() {
    // Only the chip build needs the ESP-IDF environment exported to rustc;
    // host builds (simulation, tests) skip it entirely.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
