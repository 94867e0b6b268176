// End-to-end rendering scenario: default bench constants, serial 5,
// token issued by the server as "abc123".

use provision_tool::record::ConfigRecord;
use provision_tool::registration;
use provision_tool::settings::Settings;

#[test]
fn test_reference_provisioning_record() {
    let settings = Settings::default();
    let record = ConfigRecord::new(&settings, "abc123");

    let expected = "\
# AAD csv file
key,type,encoding,value
config,namespace,,
SN,data,u32,5
ota_config,namespace,,
address,data,string,\"192.168.1.136:8443\"
tenant,data,string,\"default\"
tls,data,u8,1
token,data,string,\"abc123\"
poll_time,data,i32,100";

    assert_eq!(record.to_csv(), expected);
}

#[test]
fn test_reference_identity_for_default_serial() {
    let settings = Settings::default();
    assert_eq!(
        registration::controller_id(settings.serial_number),
        "AAD_00000005"
    );
    assert_eq!(registration::display_name(settings.serial_number), "AAD_5");
}

#[test]
fn test_rendered_record_survives_the_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.csv_file = dir.path().join("device_config.csv");

    let record = ConfigRecord::new(&settings, "abc123");
    record.write_to(&settings.csv_file).unwrap();

    let on_disk = std::fs::read_to_string(&settings.csv_file).unwrap();
    assert_eq!(on_disk, record.to_csv());
}
