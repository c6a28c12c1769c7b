use crate::boxes::FourCC;

/// Typed view over the box types found in HEIF files.
///
/// Anything not in this list becomes `KnownBox::Unknown(fourcc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // File-level / top-level
    Ftyp,
    Meta,
    Mdat,
    Free,
    Skip,
    Moov,

    // meta children
    Hdlr,
    Pitm,
    Iloc,
    Iinf,
    Infe,
    Ipro,
    Sinf,
    Iref,
    Idat,
    Dinf,
    Dref,
    Iprp,
    Grpl,

    // iprp children
    Ipco,
    Ipma,

    // item properties
    Ispe,
    Irot,
    Imir,
    Clap,
    AuxC,
    Colr,
    Pixi,
    Pasp,
    Hvcc,
    Av1c,

    // Raw UUID/vendor
    Uuid,

    // Anything else
    Unknown(FourCC),
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"ftyp" => KnownBox::Ftyp,
            b"meta" => KnownBox::Meta,
            b"mdat" => KnownBox::Mdat,
            b"free" => KnownBox::Free,
            b"skip" => KnownBox::Skip,
            b"moov" => KnownBox::Moov,

            b"hdlr" => KnownBox::Hdlr,
            b"pitm" => KnownBox::Pitm,
            b"iloc" => KnownBox::Iloc,
            b"iinf" => KnownBox::Iinf,
            b"infe" => KnownBox::Infe,
            b"ipro" => KnownBox::Ipro,
            b"sinf" => KnownBox::Sinf,
            b"iref" => KnownBox::Iref,
            b"idat" => KnownBox::Idat,
            b"dinf" => KnownBox::Dinf,
            b"dref" => KnownBox::Dref,
            b"iprp" => KnownBox::Iprp,
            b"grpl" => KnownBox::Grpl,

            b"ipco" => KnownBox::Ipco,
            b"ipma" => KnownBox::Ipma,

            b"ispe" => KnownBox::Ispe,
            b"irot" => KnownBox::Irot,
            b"imir" => KnownBox::Imir,
            b"clap" => KnownBox::Clap,
            b"auxC" => KnownBox::AuxC,
            b"colr" => KnownBox::Colr,
            b"pixi" => KnownBox::Pixi,
            b"pasp" => KnownBox::Pasp,
            b"hvcC" => KnownBox::Hvcc,
            b"av1C" => KnownBox::Av1c,

            b"uuid" => KnownBox::Uuid,

            _ => KnownBox::Unknown(cc),
        }
    }
}

impl KnownBox {
    /// Human-readable box name, used in logs and CLI output.
    pub fn full_name(&self) -> &'static str {
        match self {
            KnownBox::Ftyp => "File Type Box",
            KnownBox::Meta => "Meta Box",
            KnownBox::Mdat => "Media Data Box",
            KnownBox::Free => "Free Space Box",
            KnownBox::Skip => "Free Space Box",
            KnownBox::Moov => "Movie Box",

            KnownBox::Hdlr => "Handler Reference Box",
            KnownBox::Pitm => "Primary Item Box",
            KnownBox::Iloc => "Item Location Box",
            KnownBox::Iinf => "Item Information Box",
            KnownBox::Infe => "Item Information Entry",
            KnownBox::Ipro => "Item Protection Box",
            KnownBox::Sinf => "Protection Scheme Information Box",
            KnownBox::Iref => "Item Reference Box",
            KnownBox::Idat => "Item Data Box",
            KnownBox::Dinf => "Data Information Box",
            KnownBox::Dref => "Data Reference Box",
            KnownBox::Iprp => "Item Properties Box",
            KnownBox::Grpl => "Groups List Box",

            KnownBox::Ipco => "Item Property Container Box",
            KnownBox::Ipma => "Item Property Association Box",

            KnownBox::Ispe => "Image Spatial Extents Property",
            KnownBox::Irot => "Image Rotation Box",
            KnownBox::Imir => "Image Mirror Box",
            KnownBox::Clap => "Clean Aperture Box",
            KnownBox::AuxC => "Auxiliary Type Property",
            KnownBox::Colr => "Colour Information Box",
            KnownBox::Pixi => "Pixel Information Box",
            KnownBox::Pasp => "Pixel Aspect Ratio Box",
            KnownBox::Hvcc => "HEVC Configuration Box",
            KnownBox::Av1c => "AV1 Configuration Box",

            KnownBox::Uuid => "User Extension Box",

            KnownBox::Unknown(_) => "Unknown Box",
        }
    }

    /// Whether the payload is itself a sequence of boxes.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            KnownBox::Meta
                | KnownBox::Moov
                | KnownBox::Dinf
                | KnownBox::Iprp
                | KnownBox::Ipco
                | KnownBox::Grpl
                | KnownBox::Iref
        )
    }

    /// Whether the payload starts with version and flags.
    pub fn is_full_box(&self) -> bool {
        matches!(
            self,
            KnownBox::Meta
                | KnownBox::Hdlr
                | KnownBox::Pitm
                | KnownBox::Iloc
                | KnownBox::Iinf
                | KnownBox::Infe
                | KnownBox::Ipro
                | KnownBox::Iref
                | KnownBox::Dref
                | KnownBox::Ipma
                | KnownBox::Ispe
                | KnownBox::AuxC
                | KnownBox::Pixi
        )
    }
}
