use chrono::{DateTime, NaiveDate, Utc};
use engine::emanifest::{self, EmanifestParams, DEFAULT_CUSTOMS_OFFICE, DEFAULT_UNLOADING_PORT};
use engine::{ContainerDetail, DeliveryOrder, EngineError, Job, JobContainer};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("test timestamp must parse")
}

fn params<'a>(orders: &'a [DeliveryOrder], jobs: &'a [Job]) -> EmanifestParams<'a> {
    EmanifestParams {
        delivery_orders: orders,
        jobs,
        selected_voyage: None,
        last_port_departure: None,
        customs_office_code: None,
        selected_mbl: None,
        today: today(),
    }
}

fn order(house_bl: &str) -> DeliveryOrder {
    DeliveryOrder {
        house_bl: Some(house_bl.to_string()),
        ..Default::default()
    }
}

/// Extract the text content of every occurrence of `tag`, in document order.
fn texts(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    xml.lines()
        .filter_map(|line| {
            let line = line.trim();
            let body = line.strip_prefix(open.as_str())?;
            body.strip_suffix(close.as_str()).map(str::to_string)
        })
        .collect()
}

#[test]
fn empty_selection_is_rejected() {
    let err = emanifest::generate(&params(&[], &[])).unwrap_err();
    match err {
        EngineError::EmptyInput(_) => {}
        other => panic!("expected EmptyInput, got {other:?}"),
    }
}

#[test]
fn identical_inputs_render_byte_identical_documents() {
    let orders = vec![order("HBL-1"), order("HBL-2")];
    let p = params(&orders, &[]);
    let first = emanifest::generate(&p).unwrap();
    let second = emanifest::generate(&p).unwrap();
    assert_eq!(first, second);
}

#[test]
fn segments_follow_creation_time_with_missing_timestamps_first() {
    let mut third = order("HBL-3");
    third.created_at = Some(ts("2026-01-03T00:00:00Z"));
    let mut first = order("HBL-1");
    first.created_at = Some(ts("2026-01-01T00:00:00Z"));
    let mut second = order("HBL-2");
    second.created_at = Some(ts("2026-01-02T00:00:00Z"));
    let undated = order("HBL-0");

    let orders = vec![third, first, second, undated];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();

    assert_eq!(texts(&xml, "Bol_reference"), ["HBL-0", "HBL-1", "HBL-2", "HBL-3"]);
    assert_eq!(texts(&xml, "Line_number"), ["1", "2", "3", "4"]);
}

#[test]
fn equal_timestamps_keep_input_order() {
    let when = Some(ts("2026-01-01T00:00:00Z"));
    let mut a = order("HBL-A");
    a.created_at = when;
    let mut b = order("HBL-B");
    b.created_at = when;

    let orders = vec![a, b];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();
    assert_eq!(texts(&xml, "Bol_reference"), ["HBL-A", "HBL-B"]);
}

#[test]
fn container_block_prefers_the_weighted_container_and_joins_its_seal() {
    let mut o = order("HBL-1");
    o.job_id = Some("J1".to_string());
    o.container_details = vec![
        ContainerDetail {
            container_no: Some("CNT1".to_string()),
            gross_weight: None,
            container_type: Some("20GP".to_string()),
        },
        ContainerDetail {
            container_no: Some("CNT2".to_string()),
            gross_weight: Some(500.0),
            container_type: Some("40HC".to_string()),
        },
    ];
    let job = Job {
        id: "J1".to_string(),
        containers: vec![JobContainer {
            container_no: Some("CNT2".to_string()),
            seal_no: Some("SEAL99".to_string()),
        }],
        ..Default::default()
    };

    let orders = vec![o];
    let jobs = vec![job];
    let xml = emanifest::generate(&params(&orders, &jobs)).unwrap();

    assert_eq!(texts(&xml, "Ctn_reference"), ["CNT2"]);
    assert_eq!(texts(&xml, "Type_of_container"), ["40HC"]);
    assert_eq!(texts(&xml, "Marks1"), ["SEAL99"]);
    // Only weighted containers count as cargo.
    assert_eq!(texts(&xml, "Number_of_containers"), ["1"]);
}

#[test]
fn container_block_falls_back_to_the_first_container_then_to_blanks() {
    let mut unweighted = order("HBL-1");
    unweighted.container_details = vec![ContainerDetail {
        container_no: Some("CNT1".to_string()),
        gross_weight: None,
        container_type: None,
    }];
    let bare = order("HBL-2");

    let orders = vec![unweighted, bare];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();

    assert_eq!(texts(&xml, "Ctn_reference"), ["CNT1", ""]);
    assert_eq!(texts(&xml, "Marks1"), ["", ""]);
    assert_eq!(texts(&xml, "Number_of_containers"), ["0", "0"]);
}

#[test]
fn missing_measures_render_the_standing_defaults() {
    let orders = vec![order("HBL-1")];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();

    assert_eq!(texts(&xml, "Gross_mass"), ["2150.00"]);
    assert_eq!(texts(&xml, "Volume_in_cubic_meters"), ["20.00"]);
    assert_eq!(texts(&xml, "Number_of_packages"), ["0"]);
}

#[test]
fn recorded_measures_render_with_two_decimals() {
    let mut o = order("HBL-1");
    o.gross_weight = Some(1234.5);
    o.cbm = Some(3.456);
    o.no_of_packages = Some(48);

    let orders = vec![o];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();

    assert_eq!(texts(&xml, "Gross_mass"), ["1234.50"]);
    assert_eq!(texts(&xml, "Volume_in_cubic_meters"), ["3.46"]);
    assert_eq!(texts(&xml, "Number_of_packages"), ["48"]);
}

#[test]
fn header_defaults_when_nothing_is_selected_or_joined() {
    let orders = vec![order("HBL-1")];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();

    assert_eq!(texts(&xml, "Customs_office_code"), [DEFAULT_CUSTOMS_OFFICE]);
    assert_eq!(texts(&xml, "Voyage_number"), ["UNKNOWN"]);
    assert_eq!(texts(&xml, "Master_bill_of_lading"), ["UNKNOWN"]);
    assert_eq!(texts(&xml, "Date_of_departure"), [today().to_string()]);
}

#[test]
fn header_prefers_selection_over_job_data() {
    let mut o = order("HBL-1");
    o.job_id = Some("J1".to_string());
    let job = Job {
        id: "J1".to_string(),
        voyage: Some("JOB-VOY".to_string()),
        mbl_number: Some("JOB-MBL".to_string()),
        last_port_etd: Some(ts("2026-02-02T09:30:00Z")),
        ..Default::default()
    };

    let orders = vec![o];
    let jobs = vec![job];
    let mut p = params(&orders, &jobs);
    p.selected_voyage = Some("SEL-VOY");
    p.customs_office_code = Some("SEKLM");
    p.selected_mbl = Some("SEL-MBL");
    p.last_port_departure = NaiveDate::from_ymd_opt(2026, 1, 15);

    let xml = emanifest::generate(&p).unwrap();
    assert_eq!(texts(&xml, "Customs_office_code"), ["SEKLM"]);
    assert_eq!(texts(&xml, "Voyage_number"), ["SEL-VOY"]);
    // The first order carries no master BL, so the selection wins.
    assert_eq!(texts(&xml, "Master_bill_of_lading"), ["SEL-MBL"]);
    // The job ETD outranks the selected departure date.
    assert_eq!(texts(&xml, "Date_of_departure"), ["2026-02-02"]);
}

#[test]
fn header_falls_back_to_the_first_orders_job() {
    let mut o = order("HBL-1");
    o.job_id = Some("J1".to_string());
    let job = Job {
        id: "J1".to_string(),
        voyage: Some("JOB-VOY".to_string()),
        mbl_number: Some("JOB-MBL".to_string()),
        ..Default::default()
    };

    let orders = vec![o];
    let jobs = vec![job];
    let xml = emanifest::generate(&params(&orders, &jobs)).unwrap();
    assert_eq!(texts(&xml, "Voyage_number"), ["JOB-VOY"]);
    assert_eq!(texts(&xml, "Master_bill_of_lading"), ["JOB-MBL"]);
}

#[test]
fn master_bl_prefers_the_first_orders_own_number() {
    let mut o = order("HBL-1");
    o.mbl_number = Some("DO-MBL".to_string());

    let orders = vec![o];
    let mut p = params(&orders, &[]);
    p.selected_mbl = Some("SEL-MBL");

    let xml = emanifest::generate(&p).unwrap();
    assert_eq!(texts(&xml, "Master_bill_of_lading"), ["DO-MBL"]);
}

#[test]
fn departure_uses_the_selected_date_when_the_job_has_no_etd() {
    let orders = vec![order("HBL-1")];
    let mut p = params(&orders, &[]);
    p.last_port_departure = NaiveDate::from_ymd_opt(2026, 1, 15);

    let xml = emanifest::generate(&p).unwrap();
    assert_eq!(texts(&xml, "Date_of_departure"), ["2026-01-15"]);
}

#[test]
fn port_fallbacks_run_order_then_job_then_defaults() {
    // Nothing anywhere: loading UNKNOWN, unloading LKCMB.
    let orders = vec![order("HBL-1")];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();
    assert_eq!(texts(&xml, "Place_of_loading_code"), ["UNKNOWN"]);
    assert_eq!(texts(&xml, "Place_of_unloading_code"), [DEFAULT_UNLOADING_PORT]);

    // Job discharge code fills both when the order is silent.
    let mut o = order("HBL-1");
    o.job_id = Some("J1".to_string());
    let job = Job {
        id: "J1".to_string(),
        port_discharge_code: Some("LKGAL".to_string()),
        ..Default::default()
    };
    let orders = vec![o];
    let jobs = vec![job];
    let xml = emanifest::generate(&params(&orders, &jobs)).unwrap();
    assert_eq!(texts(&xml, "Place_of_loading_code"), ["LKGAL"]);
    assert_eq!(texts(&xml, "Place_of_unloading_code"), ["LKGAL"]);

    // The order's own codes always win.
    let mut o = order("HBL-1");
    o.port_of_loading_code = Some("CNSHA".to_string());
    o.port_of_discharge_code = Some("LKCMB".to_string());
    let orders = vec![o];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();
    assert_eq!(texts(&xml, "Place_of_loading_code"), ["CNSHA"]);
    assert_eq!(texts(&xml, "Place_of_unloading_code"), ["LKCMB"]);
}

#[test]
fn party_blocks_default_to_unknown_names_and_blank_addresses() {
    let orders = vec![order("HBL-1")];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();

    assert_eq!(texts(&xml, "Exporter_name"), ["UNKNOWN"]);
    assert_eq!(texts(&xml, "Exporter_address"), [""]);
    assert_eq!(texts(&xml, "Consignee_name"), ["UNKNOWN"]);
    assert_eq!(texts(&xml, "Notify_name"), ["UNKNOWN"]);
}

#[test]
fn carrier_and_freight_literals_are_fixed() {
    let orders = vec![order("HBL-1")];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();

    assert_eq!(texts(&xml, "Carrier_code"), ["MCL"]);
    assert_eq!(
        texts(&xml, "Carrier_name"),
        ["MERIDIAN CONSOLIDATORS LANKA (PVT) LTD"]
    );
    assert_eq!(texts(&xml, "Freight_value"), ["00"]);
    assert_eq!(texts(&xml, "Freight_currency"), ["ZZZ"]);
}

#[test]
fn information_carries_the_job_eta_date_or_today() {
    let mut with_eta = order("HBL-1");
    with_eta.job_id = Some("J1".to_string());
    with_eta.created_at = Some(ts("2026-01-01T00:00:00Z"));
    let mut eta_less = order("HBL-2");
    eta_less.job_id = Some("J2".to_string());
    eta_less.created_at = Some(ts("2026-01-02T00:00:00Z"));
    let jobs = vec![
        Job {
            id: "J1".to_string(),
            eta_date_time: Some(ts("2026-03-20T06:00:00Z")),
            ..Default::default()
        },
        Job {
            id: "J2".to_string(),
            ..Default::default()
        },
    ];

    let orders = vec![with_eta, eta_less];
    let xml = emanifest::generate(&params(&orders, &jobs)).unwrap();
    assert_eq!(
        texts(&xml, "Information"),
        vec!["2026-03-20".to_string(), today().to_string()]
    );
}

#[test]
fn an_unresolved_job_inherits_the_header_job() {
    let mut lead = order("HBL-1");
    lead.job_id = Some("J1".to_string());
    lead.created_at = Some(ts("2026-01-01T00:00:00Z"));
    let mut jobless = order("HBL-2");
    jobless.created_at = Some(ts("2026-01-02T00:00:00Z"));
    let jobs = vec![Job {
        id: "J1".to_string(),
        port_discharge_code: Some("LKGAL".to_string()),
        ..Default::default()
    }];

    let orders = vec![lead, jobless];
    let xml = emanifest::generate(&params(&orders, &jobs)).unwrap();
    assert_eq!(texts(&xml, "Place_of_unloading_code"), ["LKGAL", "LKGAL"]);
}

#[test]
fn text_content_is_escaped() {
    let mut o = order("HBL-1");
    o.shipper_name = Some("SMITH & SONS <PVT>".to_string());

    let orders = vec![o];
    let xml = emanifest::generate(&params(&orders, &[])).unwrap();
    assert!(xml.contains("<Exporter_name>SMITH &amp; SONS &lt;PVT&gt;</Exporter_name>"));
}
