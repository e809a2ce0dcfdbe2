//! Chunk ids and codes shared with archive writers.
//!
//! Ids are grouped by section: the high byte separates root (`0x01`) from state (`0x02`)
//! chunks, the next bytes identify the section and sub-record.

use crate::mesh::ElementType;
use crate::{Error, Result};

/// Leading file magic (`"BEF\0"` read little-endian).
pub const PLT_MAGIC: u32 = 0x0046_4542;
/// Newest archive version this reader understands.
pub const PLT_VERSION: u32 = 0x0031;
/// Width of fixed name fields.
pub const NAME_SIZE: usize = 64;

/// Root section: header and dictionary.
pub const ROOT: u32 = 0x0100_0000;
/// Archive header.
pub const HEADER: u32 = 0x0101_0000;
/// Archive version word.
pub const HDR_VERSION: u32 = 0x0101_0001;
/// Compression code of the mesh and state sections.
pub const HDR_COMPRESSION: u32 = 0x0101_0004;
/// Name of the writing software.
pub const HDR_SOFTWARE: u32 = 0x0101_0005;

/// Field dictionary.
pub const DICTIONARY: u32 = 0x0102_0000;
/// One dictionary item.
pub const DIC_ITEM: u32 = 0x0102_0001;
/// Item data type code.
pub const DIC_ITEM_TYPE: u32 = 0x0102_0002;
/// Item storage format code.
pub const DIC_ITEM_FMT: u32 = 0x0102_0003;
/// Item name, optionally `prefix=name`.
pub const DIC_ITEM_NAME: u32 = 0x0102_0004;
/// Component count of array items.
pub const DIC_ITEM_ARRAYSIZE: u32 = 0x0102_0005;
/// One component name of an array item.
pub const DIC_ITEM_ARRAYNAME: u32 = 0x0102_0006;
/// Global items.
pub const DIC_GLOBAL: u32 = 0x0102_1000;
/// Nodal items.
pub const DIC_NODAL: u32 = 0x0102_3000;
/// Element (domain) items.
pub const DIC_DOMAIN: u32 = 0x0102_4000;
/// Face (surface) items.
pub const DIC_SURFACE: u32 = 0x0102_5000;

/// Mesh section.
pub const MESH: u32 = 0x0104_0000;
/// Node section.
pub const NODE_SECTION: u32 = 0x0104_1000;
/// Node header.
pub const NODE_HEADER: u32 = 0x0104_1100;
/// Node count.
pub const NODE_SIZE: u32 = 0x0104_1101;
/// Coordinates per node.
pub const NODE_DIM: u32 = 0x0104_1102;
/// Node section name.
pub const NODE_NAME: u32 = 0x0104_1103;
/// Node ids and coordinates.
pub const NODE_COORDS: u32 = 0x0104_1200;

/// Domain section.
pub const DOMAIN_SECTION: u32 = 0x0104_2000;
/// One domain.
pub const DOMAIN: u32 = 0x0104_2100;
/// Domain header.
pub const DOMAIN_HDR: u32 = 0x0104_2101;
/// Domain element type code.
pub const DOM_ELEM_TYPE: u32 = 0x0104_2102;
/// Domain part id, 1-based.
pub const DOM_PART_ID: u32 = 0x0104_2103;
/// Domain element count.
pub const DOM_ELEMS: u32 = 0x0104_2104;
/// Domain name.
pub const DOM_NAME: u32 = 0x0104_2105;
/// Domain element list.
pub const DOM_ELEM_LIST: u32 = 0x0104_2200;
/// One element: id followed by its nodes.
pub const ELEMENT: u32 = 0x0104_2201;

/// Surface section.
pub const SURFACE_SECTION: u32 = 0x0104_3000;
/// One surface.
pub const SURFACE: u32 = 0x0104_3100;
/// Surface header.
pub const SURFACE_HDR: u32 = 0x0104_3101;
/// Surface id.
pub const SURFACE_ID: u32 = 0x0104_3102;
/// Surface face count.
pub const SURFACE_FACES: u32 = 0x0104_3103;
/// Surface name.
pub const SURFACE_NAME: u32 = 0x0104_3104;
/// Node slots per face record.
pub const SURFACE_MAX_FACET_NODES: u32 = 0x0104_3105;
/// Surface face list.
pub const FACE_LIST: u32 = 0x0104_3200;
/// One face record: id, node count, node slots.
pub const FACE: u32 = 0x0104_3201;

/// Node set section.
pub const NODESET_SECTION: u32 = 0x0104_4000;
/// One node set.
pub const NODESET: u32 = 0x0104_4100;
/// Node set header.
pub const NODESET_HDR: u32 = 0x0104_4101;
/// Node set id.
pub const NODESET_ID: u32 = 0x0104_4102;
/// Node set name.
pub const NODESET_NAME: u32 = 0x0104_4103;
/// Node set size.
pub const NODESET_SIZE: u32 = 0x0104_4104;
/// Node set node list.
pub const NODESET_LIST: u32 = 0x0104_4200;

/// Parts section.
pub const PARTS_SECTION: u32 = 0x0104_5000;
/// One part.
pub const PART: u32 = 0x0104_5100;
/// Part id.
pub const PART_ID: u32 = 0x0104_5101;
/// Part name.
pub const PART_NAME: u32 = 0x0104_5102;

/// State section.
pub const STATE: u32 = 0x0200_0000;
/// State header.
pub const STATE_HEADER: u32 = 0x0201_0000;
/// State time.
pub const STATE_HDR_TIME: u32 = 0x0201_0002;
/// State data.
pub const STATE_DATA: u32 = 0x0202_0000;
/// One state variable.
pub const STATE_VARIABLE: u32 = 0x0202_0001;
/// Variable id, a 1-based dictionary index.
pub const STATE_VAR_ID: u32 = 0x0202_0002;
/// Variable data; children are tagged with a 1-based region index.
pub const STATE_VAR_DATA: u32 = 0x0202_0003;
/// Global variables.
pub const GLOBAL_DATA: u32 = 0x0202_0100;
/// Nodal variables.
pub const NODE_DATA: u32 = 0x0202_0300;
/// Element variables.
pub const ELEMENT_DATA: u32 = 0x0202_0400;
/// Face variables.
pub const FACE_DATA: u32 = 0x0202_0500;
/// Mesh state.
pub const MESH_STATE: u32 = 0x0203_0000;
/// Per-element visibility flags.
pub const ELEMENT_STATE: u32 = 0x0203_0001;

/// Element type codes in domain order of the on-disk table.
const ELEMENT_CODES: [ElementType; 17] = [
	ElementType::Hex8,
	ElementType::Penta6,
	ElementType::Tet4,
	ElementType::Quad4,
	ElementType::Tri3,
	ElementType::Truss2,
	ElementType::Hex20,
	ElementType::Tet10,
	ElementType::Tet15,
	ElementType::Hex27,
	ElementType::Tri6,
	ElementType::Quad8,
	ElementType::Quad9,
	ElementType::Penta15,
	ElementType::Tet20,
	ElementType::Tet5,
	ElementType::Pyra5,
];

/// Resolve a domain element type code.
pub fn element_type(code: u32) -> Result<ElementType> {
	usize::try_from(code)
		.ok()
		.and_then(|index| ELEMENT_CODES.get(index))
		.copied()
		.ok_or(Error::UnknownElementType { code })
}

/// On-disk code of an element type.
pub fn element_code(ty: ElementType) -> u32 {
	ELEMENT_CODES.iter().position(|candidate| *candidate == ty).unwrap_or_default() as u32
}
