#![allow(dead_code)]

use csv::ReaderBuilder;
use spoke::{
    profile::{FieldInfo, FieldKind, Profile},
    sans::check::compute_crc,
};

pub const PROFILE: &str = "\
message,0,file_id
field,0,0,type,enum_file,0,0
field,0,1,manufacturer,enum_manufacturer,0,0
field,0,2,product,uint16,0,0
field,0,3,serial_number,uint32z,0,0
field,0,4,time_created,date_time,0,0
message,20,record
field,20,253,timestamp,date_time,0,0
field,20,0,position_lat,coordinates,0,0
field,20,1,position_long,coordinates,0,0
field,20,2,altitude,uint16,5,500
field,20,3,heart_rate,uint8,0,0,bpm
field,20,6,speed,uint16,1000,0,m/s
field,20,13,temperature,sint8,0,0
message,21,event
field,21,0,event,enum_event,0,0
field,21,1,event_type,enum_event_type,0,0
field,21,3,data,uint32,0,0
message,23,device_info
field,23,1,device_type,uint8,0,0
field,23,2,manufacturer,enum_manufacturer,0,0
field,23,4,product,uint16,0,0
field,23,25,source_type,enum_source_type,0,0
message,34,activity
field,34,1,num_sessions,uint16,0,0
field,34,5,local_timestamp,local_date_time,0,0
message,206,field_description
field,206,0,developer_data_index,uint8,0,0
field,206,1,field_definition_number,uint8,0,0
field,206,2,fit_base_type_id,uint8,0,0
field,206,3,field_name,string,0,0
field,206,8,units,string,0,0
message,1000,broken
field,1000,0,mode,enum_missing,0,0
field,1000,1,count,uint16,0,0
enum,enum_file,4,activity
enum,enum_manufacturer,1,garmin
enum,enum_manufacturer,15,dynastream
enum,enum_manufacturer,32,wahoo_fitness
enum,enum_event,0,timer
enum,enum_event,42,front_gear_change
enum,enum_event,43,rear_gear_change
enum,enum_event_type,0,start
enum,enum_event_type,3,marker
enum,enum_source_type,1,antplus
enum,enum_source_type,5,local
enum,enum_antplus_device_type,120,heart_rate
enum,enum_garmin_product,2697,fenix6
";

/// Load a dictionary from rows of `message`, `field` and `enum` entries.
/// Field rows may end with a units column.
pub fn profile() -> Profile {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(PROFILE.as_bytes());

    let mut profile = Profile::new();

    for record in reader.records() {
        let r = record.unwrap();
        match &r[0] {
            "message" => {
                profile.message(r[1].parse().unwrap(), &r[2]);
            }
            "field" => {
                let mut info = FieldInfo::new(&r[3], FieldKind::parse(&r[4]))
                    .scale(r[5].parse().unwrap())
                    .offset(r[6].parse().unwrap());
                if let Some(units) = r.get(7) {
                    info = info.units(units);
                }
                profile.field(r[1].parse().unwrap(), r[2].parse().unwrap(), info);
            }
            "enum" => {
                profile.enumeration(&r[1], r[2].parse().unwrap(), &r[3]);
            }
            kind => panic!("unknown profile row kind {kind}"),
        }
    }

    profile
}

/// Assembles documents record by record.
#[derive(Default)]
pub struct Document {
    records: Vec<u8>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition record. Fields are (number, size, base type).
    pub fn definition(
        &mut self,
        local: u8,
        global: u16,
        big_endian: bool,
        fields: &[(u8, u8, u8)],
    ) -> &mut Self {
        self.records.push(0x40 | local);
        self.definition_body(global, big_endian, fields);
        self
    }

    /// Append a definition record with developer fields, given as
    /// (number, size, developer data index).
    pub fn developer_definition(
        &mut self,
        local: u8,
        global: u16,
        fields: &[(u8, u8, u8)],
        developer_fields: &[(u8, u8, u8)],
    ) -> &mut Self {
        self.records.push(0x60 | local);
        self.definition_body(global, false, fields);
        self.records.push(developer_fields.len() as u8);
        for (number, size, index) in developer_fields {
            self.records.extend([*number, *size, *index]);
        }
        self
    }

    fn definition_body(&mut self, global: u16, big_endian: bool, fields: &[(u8, u8, u8)]) {
        let global = if big_endian {
            global.to_be_bytes()
        } else {
            global.to_le_bytes()
        };

        self.records.push(0);
        self.records.push(big_endian as u8);
        self.records.extend(global);
        self.records.push(fields.len() as u8);
        for (number, size, base_type) in fields {
            self.records.extend([*number, *size, *base_type]);
        }
    }

    /// Append a data record with a normal header.
    pub fn data(&mut self, local: u8, body: &[u8]) -> &mut Self {
        self.records.push(local);
        self.records.extend(body);
        self
    }

    /// Append a data record with a compressed timestamp header.
    pub fn compressed(&mut self, local: u8, time_offset: u8, body: &[u8]) -> &mut Self {
        self.records.push(0x80 | (local << 5) | time_offset);
        self.records.extend(body);
        self
    }

    /// Append arbitrary bytes to the record section.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.records.extend(bytes);
        self
    }

    /// The complete document, with a 14-byte header and valid check values.
    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![14, 0x20];
        out.extend(2132u16.to_le_bytes());
        out.extend((self.records.len() as u32).to_le_bytes());
        out.extend(b".FIT");
        let header_crc = compute_crc(&out);
        out.extend(header_crc.to_le_bytes());

        out.extend(&self.records);
        let crc = compute_crc(&out);
        out.extend(crc.to_le_bytes());

        out
    }

    /// The complete document, with a 12-byte header lacking a check value.
    pub fn build_short(&self) -> Vec<u8> {
        let mut out = vec![12, 0x10];
        out.extend(2132u16.to_le_bytes());
        out.extend((self.records.len() as u32).to_le_bytes());
        out.extend(b".FIT");

        out.extend(&self.records);
        let crc = compute_crc(&out);
        out.extend(crc.to_le_bytes());

        out
    }
}
