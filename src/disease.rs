//! Closed set of skin-condition labels and their embedded knowledge base.
//!
//! One enum covers both roles the label plays: the classifier's output order
//! (`from_index`) and the lookup key for display metadata (`info`). Label
//! strings are the exact strings the model artifact was trained against,
//! including the historical trailing space on `Benign Keratosis-like Lesions `.

use thiserror::Error;

/// Number of classes the model scores.
pub const LABEL_COUNT: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown disease label: {0:?}")]
pub struct UnknownLabel(pub String);

/// Display metadata for one label.
#[derive(Debug, PartialEq, Eq)]
pub struct DiseaseInfo {
    pub name: &'static str,
    pub description: &'static [&'static str],
    pub medication: &'static str,
    pub diet: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiseaseLabel {
    Eczema,
    WartsMolluscumViral,
    Melanoma,
    AtopicDermatitis,
    BasalCellCarcinoma,
    MelanocyticNevi,
    BenignKeratosisLikeLesions,
    PsoriasisLichen,
    SeborrheicKeratoses,
    TineaFungal,
}

impl DiseaseLabel {
    /// All labels in classifier output order.
    pub const ALL: [DiseaseLabel; LABEL_COUNT] = [
        DiseaseLabel::Eczema,
        DiseaseLabel::WartsMolluscumViral,
        DiseaseLabel::Melanoma,
        DiseaseLabel::AtopicDermatitis,
        DiseaseLabel::BasalCellCarcinoma,
        DiseaseLabel::MelanocyticNevi,
        DiseaseLabel::BenignKeratosisLikeLesions,
        DiseaseLabel::PsoriasisLichen,
        DiseaseLabel::SeborrheicKeratoses,
        DiseaseLabel::TineaFungal,
    ];

    /// Map a classifier output index to its label.
    pub fn from_index(index: usize) -> Option<DiseaseLabel> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eczema => "eczema",
            Self::WartsMolluscumViral => "warts_molluscum_viral",
            Self::Melanoma => "melanoma",
            Self::AtopicDermatitis => "atopic_dermatitis",
            Self::BasalCellCarcinoma => "Basal Cell Carcinoma",
            Self::MelanocyticNevi => "Melanocytic Nevi",
            Self::BenignKeratosisLikeLesions => "Benign Keratosis-like Lesions ",
            Self::PsoriasisLichen => "psoriasis_lichen",
            Self::SeborrheicKeratoses => "seborrheic_keratoses",
            Self::TineaFungal => "tinea_fungal",
        }
    }

    pub fn info(&self) -> &'static DiseaseInfo {
        match self {
            Self::Eczema => &DiseaseInfo {
                name: "Eczema",
                description: &[
                    "A chronic condition causing itchy, inflamed, and dry skin.",
                    "Often triggered by allergens, stress, or environmental factors.",
                ],
                medication: "Topical corticosteroids, antihistamines for itching, and moisturizers to reduce dryness.",
                diet: "Omega-3-rich foods (like fish and flaxseeds), avoid processed foods and excessive dairy.",
            },
            Self::WartsMolluscumViral => &DiseaseInfo {
                name: "Warts, Molluscum, and Other Viral Infections",
                description: &[
                    "Caused by viral infections such as HPV or Molluscum contagiosum.",
                    "Appear as small bumps or lesions, sometimes contagious through contact.",
                ],
                medication: "Cryotherapy, salicylic acid treatments, or topical antivirals under medical supervision.",
                diet: "Boost immunity with vitamin C and zinc-rich foods (citrus, spinach, pumpkin seeds).",
            },
            Self::Melanoma => &DiseaseInfo {
                name: "Melanoma",
                description: &[
                    "A serious form of skin cancer that develops from pigment-producing cells (melanocytes).",
                    "Early detection is crucial to prevent spreading.",
                ],
                medication: "Surgical removal, immunotherapy, or targeted therapy. Urgent dermatologist consultation required.",
                diet: "High-antioxidant diet including berries, leafy greens, and vitamin D-rich foods.",
            },
            Self::AtopicDermatitis => &DiseaseInfo {
                name: "Atopic Dermatitis",
                description: &[
                    "A common type of eczema causing red, itchy, and cracked skin.",
                    "Usually starts in childhood and may flare up periodically.",
                ],
                medication: "Moisturizers, steroid creams, or calcineurin inhibitors. Avoid irritants and stress.",
                diet: "Probiotic-rich foods (yogurt, kefir) and foods high in omega-3s to reduce inflammation.",
            },
            Self::BasalCellCarcinoma => &DiseaseInfo {
                name: "Basal Cell Carcinoma (BCC)",
                description: &[
                    "A slow-growing type of skin cancer appearing as pearly or waxy bumps.",
                    "Usually caused by long-term UV exposure.",
                ],
                medication: "Surgical excision, topical treatments, or Mohs surgery. Regular dermatologist checkups are advised.",
                diet: "Include vitamin E, green tea, and antioxidant-rich fruits.",
            },
            Self::MelanocyticNevi => &DiseaseInfo {
                name: "Melanocytic Nevi (NV)",
                description: &[
                    "Commonly known as moles; usually harmless pigment spots on the skin.",
                    "Monitor for any changes in size, color, or shape.",
                ],
                medication: "No treatment required unless suspicious. Surgical removal if necessary.",
                diet: "Healthy balanced diet with fruits and vegetables; avoid excessive sun exposure.",
            },
            Self::BenignKeratosisLikeLesions => &DiseaseInfo {
                name: "Benign Keratosis-like Lesions (BKL)",
                description: &[
                    "Non-cancerous skin growths that appear as rough or crusty patches.",
                    "Common in older adults and may resemble warts or sun damage.",
                ],
                medication: "Laser therapy, cryotherapy, or minor surgery for cosmetic reasons.",
                diet: "Balanced diet; include foods rich in vitamins A and E for skin health.",
            },
            Self::PsoriasisLichen => &DiseaseInfo {
                name: "Psoriasis, Lichen Planus, and Related Diseases",
                description: &[
                    "Autoimmune conditions causing thick, scaly patches of skin.",
                    "May flare up due to stress, infections, or certain medications.",
                ],
                medication: "Topical corticosteroids, phototherapy, or biologic drugs depending on severity.",
                diet: "Anti-inflammatory foods such as turmeric, salmon, and leafy greens.",
            },
            Self::SeborrheicKeratoses => &DiseaseInfo {
                name: "Seborrheic Keratoses and Other Benign Tumors",
                description: &[
                    "Common, noncancerous skin growths that appear waxy or wart-like.",
                    "Usually harmless but can be removed for cosmetic reasons.",
                ],
                medication: "Cryotherapy, curettage, or laser treatment if removal desired.",
                diet: "Maintain a healthy diet; ensure proper hydration and vitamin E intake.",
            },
            Self::TineaFungal => &DiseaseInfo {
                name: "Tinea, Ringworm, Candidiasis, and Other Fungal Infections",
                description: &[
                    "Caused by fungal organisms that thrive in moist environments.",
                    "Common symptoms include itching, redness, and circular rashes.",
                ],
                medication: "Topical or oral antifungal medications (clotrimazole, fluconazole). Keep affected area dry.",
                diet: "Low sugar diet, include garlic and probiotics to support antifungal defense.",
            },
        }
    }
}

impl std::str::FromStr for DiseaseLabel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

impl std::fmt::Display for DiseaseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
