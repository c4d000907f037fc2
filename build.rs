fn main() {
    println!("cargo:rerun-if-env-changed=BRAILLECELL_CONFIG");
    for var in [
        "BRAILLECELL_WIFI_SSID",
        "BRAILLECELL_WIFI_PASS",
        "BRAILLECELL_MQTT_HOST",
        "BRAILLECELL_MQTT_PORT",
        "BRAILLECELL_MQTT_USER",
        "BRAILLECELL_MQTT_PASS",
        "BRAILLECELL_MQTT_TRUST",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
