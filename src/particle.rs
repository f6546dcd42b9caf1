use clap::ValueEnum;

/// Charm-hadron species with a published invariant-mass plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Particle {
    /// D0 → K−π+
    Dzero,
    /// D+ → π+K−π+
    Dplus,
    /// Λc+ → pK−π+
    #[value(name = "lambdac-pkpi")]
    LambdacToPKPi,
    /// Λc+ → pK0S
    #[value(name = "lambdac-pk0s")]
    LambdacToPKzeroShort,
}

/// Names of the fit curves stored for one pT bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitNames {
    pub total: String,
    pub background: String,
    /// Template of wrongly-assigned mass hypotheses (D0 only).
    pub reflection: Option<String>,
}

/// Legend box in NDC: `(x1, y1, x2, y2)`.
pub type NdcBox = (f64, f64, f64, f64);

impl Particle {
    pub const ALL: [Particle; 4] = [
        Particle::Dzero,
        Particle::Dplus,
        Particle::LambdacToPKPi,
        Particle::LambdacToPKzeroShort,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Particle::Dzero => "D0",
            Particle::Dplus => "D+",
            Particle::LambdacToPKPi => "Lambda_c -> pKpi",
            Particle::LambdacToPKzeroShort => "Lambda_c -> pK0s",
        }
    }

    /// Tag used in output file names.
    pub fn tag(self) -> &'static str {
        match self {
            Particle::Dzero => "Dzero",
            Particle::Dplus => "Dplus",
            Particle::LambdacToPKPi => "LambdacToPKPi",
            Particle::LambdacToPKzeroShort => "LambdacToPKzeroShort",
        }
    }

    /// Results file of the published fit, if one exists for this species.
    pub fn default_input(self) -> Option<&'static str> {
        match self {
            Particle::Dzero => Some("../Results/D0/RawYieldsData_D0_pPb5TeV_FD_pos10.parquet"),
            Particle::Dplus => Some("../Results/Dplus/rawYield_Dplus_nonprompt_enhanced.parquet"),
            Particle::LambdacToPKPi | Particle::LambdacToPKzeroShort => None,
        }
    }

    pub fn x_title(self) -> &'static str {
        match self {
            Particle::Dzero => "#it{M}(K#pi) (GeV/#it{c}^{2})",
            Particle::Dplus => "#it{M}(#piK#pi) (GeV/#it{c}^{2})",
            Particle::LambdacToPKPi => "#it{M}(pK#pi) (GeV/#it{c}^{2})",
            Particle::LambdacToPKzeroShort => "#it{M}(pK^{0}_{S}) (GeV/#it{c}^{2})",
        }
    }

    pub fn decay(self) -> &'static str {
        match self {
            Particle::Dzero => "D^{0} #rightarrow K^{#font[122]{-}}#pi^{+} and charge conj.",
            Particle::Dplus => "D^{+} #rightarrow #pi^{+}K^{#font[122]{-}}#pi^{+} and charge conj.",
            Particle::LambdacToPKPi => {
                "#Lambda_{c}^{+}  #rightarrow pK^{#font[122]{-}}#pi^{+} and charge conj."
            }
            Particle::LambdacToPKzeroShort => "#Lambda_{c}^{+}  #rightarrow pK^{0}_{S} and charge conj.",
        }
    }

    /// Raw non-prompt fraction quoted on the plot.
    pub fn nonprompt_fraction(self) -> &'static str {
        match self {
            Particle::Dzero => "#it{f}_{ non-prompt}^{ raw} = 0.531",
            Particle::Dplus => {
                "#it{f}_{ non-prompt}^{ raw} = 0.787 #pm  0.022 (stat.) #pm 0.016 (syst.)"
            }
            Particle::LambdacToPKPi => {
                "#it{f}_{ non-prompt}^{ raw} = 0.630 #pm  0.056 (stat.) #pm 0.050 (syst.)"
            }
            Particle::LambdacToPKzeroShort => {
                "#it{f}_{ non-prompt}^{ raw} = 0.549 #pm  0.138 (stat.) #pm 0.055 (syst.)"
            }
        }
    }

    /// Name of the raw-yield histogram (one bin per pT bin).
    pub fn signal_histogram(self) -> &'static str {
        match self {
            Particle::Dzero => "hRawYields",
            _ => "hRawYieldsSignal",
        }
    }

    /// Fit curve names for the pT bin `[pt_min, pt_max]`.
    ///
    /// The D0 fit stored its pT edges with a trailing `.0`.
    pub fn fit_names(self, pt_min: f64, pt_max: f64) -> FitNames {
        match self {
            Particle::Dzero => FitNames {
                total: format!("fTot_{pt_min:.0}.0_{pt_max:.0}.0"),
                background: format!("fBkg_{pt_min:.0}.0_{pt_max:.0}.0"),
                reflection: Some("freflect".to_string()),
            },
            _ => FitNames {
                total: format!("fTot_{pt_min:.0}_{pt_max:.0}"),
                background: format!("fBkg_{pt_min:.0}_{pt_max:.0}"),
                reflection: None,
            },
        }
    }

    pub fn has_reflection(self) -> bool {
        self == Particle::Dzero
    }

    pub fn legend_box(self) -> NdcBox {
        match self {
            Particle::Dzero => (0.6, 0.51, 0.87, 0.72),
            _ => (0.62, 0.58, 0.85, 0.72),
        }
    }

    /// y-axis range from the highest bin of the mass histogram and its error.
    pub fn y_range(self, maximum: f64, error_at_maximum: f64) -> (f64, f64) {
        let top = maximum + error_at_maximum;
        match self {
            Particle::Dzero => (0.0, 1.15 * top),
            _ => (40.0, 1.3 * top),
        }
    }
}
