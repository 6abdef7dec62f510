//! HTML Tag Definitions
//!
//! The web platform's tag vocabulary. The core never consults this table
//! directly; `CompilerOptions::web` wires these predicates in.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagNamespace {
    Html,
    Svg,
}

/// HTML tag definition with specific parsing rules
#[derive(Debug, Clone)]
pub struct HtmlTagDefinition {
    pub namespace: TagNamespace,
    pub is_void: bool,
    pub can_be_left_open: bool,
    pub is_non_phrasing: bool,
}

impl HtmlTagDefinition {
    pub fn new(namespace: TagNamespace) -> Self {
        HtmlTagDefinition {
            namespace,
            is_void: false,
            can_be_left_open: false,
            is_non_phrasing: false,
        }
    }

    pub fn with_void(mut self, is_void: bool) -> Self {
        self.is_void = is_void;
        self
    }

    pub fn with_left_open(mut self, can_be_left_open: bool) -> Self {
        self.can_be_left_open = can_be_left_open;
        self
    }

    pub fn with_non_phrasing(mut self, is_non_phrasing: bool) -> Self {
        self.is_non_phrasing = is_non_phrasing;
        self
    }
}

const HTML_TAGS: &str = "html,body,base,head,link,meta,style,title,\
    address,article,aside,footer,header,h1,h2,h3,h4,h5,h6,hgroup,nav,section,\
    div,dd,dl,dt,figcaption,figure,picture,hr,img,li,main,ol,p,pre,ul,\
    a,b,abbr,bdi,bdo,br,cite,code,data,dfn,em,i,kbd,mark,q,rp,rt,rtc,ruby,\
    s,samp,small,span,strong,sub,sup,time,u,var,wbr,area,audio,map,track,video,\
    embed,object,param,source,canvas,script,noscript,del,ins,\
    caption,col,colgroup,table,thead,tbody,td,th,tr,\
    button,datalist,fieldset,form,input,label,legend,meter,optgroup,option,\
    output,progress,select,textarea,\
    details,dialog,menu,menuitem,summary,\
    content,element,shadow,template,blockquote,iframe,tfoot";

const SVG_TAGS: &str = "svg,animate,circle,clippath,cursor,defs,desc,ellipse,filter,font-face,\
    foreignobject,g,glyph,image,line,marker,mask,missing-glyph,path,pattern,\
    polygon,polyline,rect,switch,symbol,text,textpath,tspan,use,view";

/// Elements that never have content
const VOID_TAGS: &str = "area,base,br,col,embed,frame,hr,img,input,isindex,keygen,\
    link,meta,param,source,track,wbr";

/// Elements that may be left open and are closed by an equally named sibling
const LEFT_OPEN_TAGS: &str = "colgroup,dd,dt,li,options,p,td,tfoot,th,thead,tr,source";

/// Block level elements that may not appear inside a `<p>`
const NON_PHRASING_TAGS: &str = "address,article,aside,base,blockquote,body,caption,col,colgroup,dd,\
    details,dialog,div,dl,dt,fieldset,figcaption,figure,footer,form,\
    h1,h2,h3,h4,h5,h6,head,header,hgroup,hr,html,legend,li,menuitem,meta,\
    optgroup,option,param,rp,rt,source,style,summary,tbody,td,tfoot,th,thead,\
    title,tr,track";

fn split_tags(list: &'static str) -> impl Iterator<Item = &'static str> {
    list.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Tag definitions registry
static TAG_DEFINITIONS: Lazy<HashMap<&'static str, HtmlTagDefinition>> = Lazy::new(|| {
    let mut defs = HashMap::new();

    for tag in split_tags(HTML_TAGS) {
        defs.insert(tag, HtmlTagDefinition::new(TagNamespace::Html));
    }
    for tag in split_tags(SVG_TAGS) {
        defs.insert(tag, HtmlTagDefinition::new(TagNamespace::Svg));
    }

    // Void and left-open lists contain a few legacy tags that are not
    // reserved (frame, isindex, keygen, options); they still get an entry
    // so that the parsing rules apply to them.
    for tag in split_tags(VOID_TAGS) {
        let def = defs
            .remove(tag)
            .unwrap_or_else(|| HtmlTagDefinition::new(TagNamespace::Html));
        defs.insert(tag, def.with_void(true));
    }
    for tag in split_tags(LEFT_OPEN_TAGS) {
        let def = defs
            .remove(tag)
            .unwrap_or_else(|| HtmlTagDefinition::new(TagNamespace::Html));
        defs.insert(tag, def.with_left_open(true));
    }
    for tag in split_tags(NON_PHRASING_TAGS) {
        let def = defs
            .remove(tag)
            .unwrap_or_else(|| HtmlTagDefinition::new(TagNamespace::Html));
        defs.insert(tag, def.with_non_phrasing(true));
    }

    defs
});

/// Legacy entries that only exist for their parsing rules
const UNRESERVED_TAGS: &[&str] = &["frame", "isindex", "keygen", "options"];

/// Look up a tag definition.
///
/// HTML names are matched exactly; SVG names are case insensitive because
/// templates commonly use the camel-cased spelling (`clipPath`).
pub fn get_html_tag_definition(tag_name: &str) -> Option<&'static HtmlTagDefinition> {
    TAG_DEFINITIONS.get(tag_name).or_else(|| {
        TAG_DEFINITIONS
            .get(tag_name.to_lowercase().as_str())
            .filter(|def| def.namespace == TagNamespace::Svg)
    })
}

pub fn is_html_tag(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name)
        .map_or(false, |def| {
            def.namespace == TagNamespace::Html && !UNRESERVED_TAGS.contains(&tag_name)
        })
}

pub fn is_svg_tag(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).map_or(false, |def| def.namespace == TagNamespace::Svg)
}

/// Native platform tag, as opposed to a user component
pub fn is_reserved_tag(tag_name: &str) -> bool {
    is_html_tag(tag_name) || is_svg_tag(tag_name)
}

pub fn is_unary_tag(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).map_or(false, |def| def.is_void)
}

pub fn can_be_left_open_tag(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).map_or(false, |def| def.can_be_left_open)
}

pub fn is_non_phrasing_tag(tag_name: &str) -> bool {
    get_html_tag_definition(tag_name).map_or(false, |def| def.is_non_phrasing)
}

pub fn is_pre_tag(tag_name: &str) -> bool {
    tag_name == "pre"
}
