//! Customs e-manifest document compiler.
//!
//! Pure transform: a filtered set of delivery orders plus their parent jobs
//! goes in, one customs-agency XML document comes out. No I/O, no shared
//! state; identical inputs (including the injected `today`) always produce
//! byte-identical output. Every absent field resolves through a documented
//! default, never through error suppression.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use crate::{DeliveryOrder, EngineError, Job, ResultEngine};

/// Customs office used when the caller selects none.
pub const DEFAULT_CUSTOMS_OFFICE: &str = "SECMB";
/// Port of discharge used when neither the delivery order nor its job
/// carries one. Applies to unloading only.
pub const DEFAULT_UNLOADING_PORT: &str = "LKCMB";

const UNKNOWN: &str = "UNKNOWN";

// The carrier block is the filing organization itself, not derived data.
const CARRIER_CODE: &str = "MCL";
const CARRIER_NAME: &str = "MERIDIAN CONSOLIDATORS LANKA (PVT) LTD";
const CARRIER_ADDRESS: &str = "LEVEL 04, 110 SIR JAMES PEIRIS MAWATHA, COLOMBO 02";

const DEFAULT_GROSS_MASS: f64 = 2150.0;
const DEFAULT_VOLUME: f64 = 20.0;

// Structural placeholder required by the agency schema.
const FREIGHT_VALUE: &str = "00";
const FREIGHT_CURRENCY: &str = "ZZZ";

/// Inputs for one document generation.
///
/// `today` is the instant's current date, passed in by the caller so the
/// date fallbacks (departure, ETA information) stay deterministic in tests.
#[derive(Clone, Debug)]
pub struct EmanifestParams<'a> {
    pub delivery_orders: &'a [DeliveryOrder],
    pub jobs: &'a [Job],
    pub selected_voyage: Option<&'a str>,
    pub last_port_departure: Option<NaiveDate>,
    pub customs_office_code: Option<&'a str>,
    pub selected_mbl: Option<&'a str>,
    pub today: NaiveDate,
}

/// Download name for a generated document: `E-Manifest_<voyage>_<date>.xml`.
pub fn document_file_name(voyage: Option<&str>, date: NaiveDate) -> String {
    format!("E-Manifest_{}_{}.xml", voyage.unwrap_or(UNKNOWN), date)
}

/// Compile the e-manifest XML for a filtered set of delivery orders.
///
/// Fails with [`EngineError::EmptyInput`] when no delivery orders matched:
/// the agency rejects empty manifests, so no document is emitted at all.
pub fn generate(params: &EmanifestParams<'_>) -> ResultEngine<String> {
    if params.delivery_orders.is_empty() {
        return Err(EngineError::EmptyInput(
            "no delivery orders matched the manifest criteria".to_string(),
        ));
    }
    debug!(
        delivery_orders = params.delivery_orders.len(),
        jobs = params.jobs.len(),
        "compiling e-manifest document"
    );

    // Ascending by creation time; a missing timestamp sorts as epoch zero.
    // The sort must be stable: segment line numbers are observable output.
    let mut sorted: Vec<&DeliveryOrder> = params.delivery_orders.iter().collect();
    sorted.sort_by_key(|d| d.created_at.unwrap_or(DateTime::UNIX_EPOCH));

    let jobs_by_id: HashMap<&str, &Job> =
        params.jobs.iter().map(|job| (job.id.as_str(), job)).collect();
    // Seal numbers live only on the job's container list. Index them once
    // per job instead of scanning per segment.
    let seals_by_job: HashMap<&str, HashMap<&str, &str>> = params
        .jobs
        .iter()
        .map(|job| (job.id.as_str(), seal_index(job)))
        .collect();

    let empty_job = Job::default();
    let first = sorted[0];
    let header_job = first
        .job_id
        .as_deref()
        .and_then(|id| jobs_by_id.get(id).copied())
        .unwrap_or(&empty_job);

    let customs_office = params
        .customs_office_code
        .unwrap_or(DEFAULT_CUSTOMS_OFFICE);
    let voyage = params
        .selected_voyage
        .or(header_job.voyage.as_deref())
        .unwrap_or(UNKNOWN);
    let departure = header_job
        .last_port_etd
        .map(|etd| etd.date_naive())
        .or(params.last_port_departure)
        .unwrap_or(params.today);
    let master_bl = first
        .mbl_number
        .as_deref()
        .or(params.selected_mbl)
        .or(header_job.mbl_number.as_deref())
        .unwrap_or(UNKNOWN);

    let mut xml = XmlWriter::new();
    xml.open("Customs_EManifest");

    xml.open("General_segment");
    xml.leaf("Customs_office_code", customs_office);
    xml.leaf("Voyage_number", voyage);
    xml.leaf("Date_of_departure", &departure.to_string());
    xml.leaf("Master_bill_of_lading", master_bl);
    xml.close("General_segment");

    for (index, order) in sorted.iter().enumerate() {
        // An unresolved job falls back to the header job, so segments on the
        // same manifest inherit the lead order's schedule rather than blanks.
        let current_job = order
            .job_id
            .as_deref()
            .and_then(|id| jobs_by_id.get(id).copied())
            .unwrap_or(header_job);
        write_bol_segment(
            &mut xml,
            index as u32 + 1,
            order,
            current_job,
            &seals_by_job,
            params.today,
        );
    }

    xml.close("Customs_EManifest");
    Ok(xml.finish())
}

fn write_bol_segment(
    xml: &mut XmlWriter,
    line_number: u32,
    order: &DeliveryOrder,
    job: &Job,
    seals_by_job: &HashMap<&str, HashMap<&str, &str>>,
    today: NaiveDate,
) {
    let cargo_count = order
        .container_details
        .iter()
        .filter(|c| c.gross_weight.is_some())
        .count();

    let loading = order
        .port_of_loading_code
        .as_deref()
        .or(job.port_discharge_code.as_deref())
        .unwrap_or(UNKNOWN);
    let unloading = order
        .port_of_discharge_code
        .as_deref()
        .or(job.port_discharge_code.as_deref())
        .unwrap_or(DEFAULT_UNLOADING_PORT);

    // Prefer the first container with a recorded weight, then the first
    // container at all, then an empty record rendering pure defaults.
    let empty_container = crate::ContainerDetail::default();
    let container = order
        .container_details
        .iter()
        .find(|c| c.gross_weight.is_some())
        .or_else(|| order.container_details.first())
        .unwrap_or(&empty_container);
    let seal = container
        .container_no
        .as_deref()
        .and_then(|container_no| {
            seals_by_job
                .get(job.id.as_str())
                .and_then(|seals| seals.get(container_no).copied())
        })
        .unwrap_or("");

    let gross_mass = order.gross_weight.unwrap_or(DEFAULT_GROSS_MASS);
    let volume = order.cbm.unwrap_or(DEFAULT_VOLUME);
    let information = job
        .eta_date_time
        .map(|eta| eta.date_naive())
        .unwrap_or(today);

    xml.open("Bol_segment");
    xml.leaf("Line_number", &line_number.to_string());
    xml.leaf("Bol_reference", order.house_bl.as_deref().unwrap_or(UNKNOWN));
    xml.leaf("Number_of_containers", &cargo_count.to_string());
    xml.leaf("Place_of_loading_code", loading);
    xml.leaf("Place_of_unloading_code", unloading);

    xml.open("Carrier");
    xml.leaf("Carrier_code", CARRIER_CODE);
    xml.leaf("Carrier_name", CARRIER_NAME);
    xml.leaf("Carrier_address", CARRIER_ADDRESS);
    xml.close("Carrier");

    xml.open("Exporter");
    xml.leaf("Exporter_name", order.shipper_name.as_deref().unwrap_or(UNKNOWN));
    xml.leaf("Exporter_address", order.shipper_address.as_deref().unwrap_or(""));
    xml.close("Exporter");

    xml.open("Consignee");
    xml.leaf(
        "Consignee_name",
        order.consignee_name.as_deref().unwrap_or(UNKNOWN),
    );
    xml.leaf(
        "Consignee_address",
        order.consignee_address.as_deref().unwrap_or(""),
    );
    xml.close("Consignee");

    xml.open("Notify");
    xml.leaf(
        "Notify_name",
        order.notify_party_name.as_deref().unwrap_or(UNKNOWN),
    );
    xml.leaf(
        "Notify_address",
        order.notify_party_address.as_deref().unwrap_or(""),
    );
    xml.close("Notify");

    xml.leaf(
        "Number_of_packages",
        &order.no_of_packages.unwrap_or(0).to_string(),
    );
    xml.leaf(
        "Package_type_code",
        order.package_type_code.as_deref().unwrap_or(""),
    );
    xml.leaf("Gross_mass", &two_decimals(gross_mass));
    xml.leaf("Volume_in_cubic_meters", &two_decimals(volume));
    xml.leaf("Marks_numbers", order.marks_numbers.as_deref().unwrap_or(""));
    xml.leaf("Goods_description", order.description.as_deref().unwrap_or(""));
    xml.leaf("Information", &information.to_string());
    xml.leaf("Freight_value", FREIGHT_VALUE);
    xml.leaf("Freight_currency", FREIGHT_CURRENCY);

    xml.open("Ctn_segment");
    xml.leaf("Ctn_reference", container.container_no.as_deref().unwrap_or(""));
    xml.leaf(
        "Type_of_container",
        container.container_type.as_deref().unwrap_or(""),
    );
    xml.leaf("Marks1", seal);
    xml.close("Ctn_segment");

    xml.close("Bol_segment");
}

/// Map a job's `container_no` to its `seal_no` for O(1) lookups while
/// rendering segments.
fn seal_index(job: &Job) -> HashMap<&str, &str> {
    job.containers
        .iter()
        .filter_map(|container| {
            container
                .container_no
                .as_deref()
                .map(|no| (no, container.seal_no.as_deref().unwrap_or("")))
        })
        .collect()
}

fn two_decimals(value: f64) -> String {
    format!("{value:.2}")
}

/// Minimal deterministic XML emitter over a `String`, two-space indents.
/// Writing to a `String` cannot fail, so the helpers stay infallible.
struct XmlWriter {
    buf: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            buf: String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"),
            depth: 0,
        }
    }

    fn open(&mut self, tag: &str) {
        self.indent();
        let _ = writeln!(self.buf, "<{tag}>");
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth -= 1;
        self.indent();
        let _ = writeln!(self.buf, "</{tag}>");
    }

    fn leaf(&mut self, tag: &str, text: &str) {
        self.indent();
        let _ = writeln!(self.buf, "<{tag}>{}</{tag}>", xml_escape(text));
    }

    fn finish(self) -> String {
        self.buf
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
